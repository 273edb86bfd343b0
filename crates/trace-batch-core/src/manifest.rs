//! Manifest loading: ordered lists of trace-file paths.
//!
//! A manifest is a plain-text file with one trace-file path per line,
//! absolute or relative to the process working directory. [`FileManifest`]
//! keeps every path as a span into one contiguous backing buffer, so the
//! whole list is owned, and freed, as a unit. Order is the manifest order;
//! there is no comment or blank-line-skipping syntax, so a blank line is an
//! empty path entry.

use std::{collections::TryReserveError, fs, io::Read, ops::Range, path::Path};

use snafu::{ResultExt, Snafu};

/// Errors raised while loading a manifest file.
#[derive(Debug, Snafu)]
pub enum ManifestError {
    /// The manifest file could not be opened.
    #[snafu(display("Cannot open manifest {path}: {source}"))]
    Open {
        /// Path of the manifest file.
        path: String,
        /// Underlying filesystem error.
        source: std::io::Error,
    },

    /// The manifest file opened but could not be read.
    #[snafu(display("Cannot read manifest {path}: {source}"))]
    Read {
        /// Path of the manifest file.
        path: String,
        /// Underlying filesystem error.
        source: std::io::Error,
    },

    /// Reserving memory for the path table failed.
    ///
    /// Reported distinctly from I/O failures so callers can tell a bad file
    /// from a starved process.
    #[snafu(display("Out of memory while loading manifest {path}: {source}"))]
    OutOfMemory {
        /// Path of the manifest file.
        path: String,
        /// The failed reservation.
        source: TryReserveError,
    },
}

/// An ordered list of trace-file paths backed by one contiguous buffer.
///
/// Entries preserve manifest order and are views into a single `String`;
/// dropping the manifest releases every path at once. An empty manifest is
/// representable (`len() == 0`) and left to callers to treat as a warning
/// or an error.
#[derive(Debug, Clone, Default)]
pub struct FileManifest {
    text: String,
    spans: Vec<Range<usize>>,
}

impl FileManifest {
    /// Load a manifest from `path`, one trace-file path per line.
    ///
    /// The terminating newline of each line is stripped, along with a
    /// carriage return if one precedes it. Loading is all-or-nothing: on any
    /// error no partial manifest is returned.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let mut file = fs::File::open(path).context(OpenSnafu { path: display.as_str() })?;
        let file_len = file.metadata().map(|m| m.len() as usize).unwrap_or(0);

        let mut text = String::new();
        text.try_reserve_exact(file_len)
            .context(OutOfMemorySnafu { path: display.as_str() })?;
        file.read_to_string(&mut text)
            .context(ReadSnafu { path: display.as_str() })?;

        // First pass counts lines so the span table is sized exactly.
        let line_count = text.lines().count();
        let mut spans = Vec::new();
        spans
            .try_reserve_exact(line_count)
            .context(OutOfMemorySnafu { path: display.as_str() })?;

        let mut start = 0usize;
        for (i, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                let end = if i > start && text.as_bytes()[i - 1] == b'\r' {
                    i - 1
                } else {
                    i
                };
                spans.push(start..end);
                start = i + 1;
            }
        }
        if start < text.len() {
            spans.push(start..text.len());
        }

        Ok(Self { text, spans })
    }

    /// Assemble a manifest from an in-memory sequence of paths.
    ///
    /// Paths keep the iteration order. Useful when the list comes from
    /// somewhere other than a manifest file.
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let mut text = String::new();
        let mut spans = Vec::new();
        for path in paths {
            let start = text.len();
            text.push_str(path.as_ref());
            spans.push(start..text.len());
        }
        Self { text, spans }
    }

    /// Number of path entries.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// True when the manifest listed no paths at all.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Path at `index`, in manifest order.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.spans.get(index).map(|span| &self.text[span.clone()])
    }

    /// First listed path, if any. Handy for header-only probes.
    pub fn first(&self) -> Option<&str> {
        self.get(0)
    }

    /// Iterate over paths in manifest order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.spans.iter().map(|span| &self.text[span.clone()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn manifest_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("tempfile");
        file.write_all(contents.as_bytes()).expect("write manifest");
        file
    }

    #[test]
    fn loads_paths_in_order() {
        let file = manifest_file("a.sac\nsub/b.sac\n/abs/c.sac\n");
        let manifest = FileManifest::load(file.path()).expect("load");

        assert_eq!(manifest.len(), 3);
        let paths: Vec<&str> = manifest.iter().collect();
        assert_eq!(paths, ["a.sac", "sub/b.sac", "/abs/c.sac"]);
        assert_eq!(manifest.first(), Some("a.sac"));
        assert_eq!(manifest.get(2), Some("/abs/c.sac"));
        assert_eq!(manifest.get(3), None);
    }

    #[test]
    fn final_line_without_newline_is_kept() {
        let file = manifest_file("a.sac\nb.sac");
        let manifest = FileManifest::load(file.path()).expect("load");
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.get(1), Some("b.sac"));
    }

    #[test]
    fn crlf_terminators_are_stripped() {
        let file = manifest_file("a.sac\r\nb.sac\r\n");
        let manifest = FileManifest::load(file.path()).expect("load");
        let paths: Vec<&str> = manifest.iter().collect();
        assert_eq!(paths, ["a.sac", "b.sac"]);
    }

    #[test]
    fn blank_lines_become_empty_entries() {
        let file = manifest_file("a.sac\n\nb.sac\n");
        let manifest = FileManifest::load(file.path()).expect("load");
        let paths: Vec<&str> = manifest.iter().collect();
        assert_eq!(paths, ["a.sac", "", "b.sac"]);
    }

    #[test]
    fn empty_manifest_loads_with_zero_entries() {
        let file = manifest_file("");
        let manifest = FileManifest::load(file.path()).expect("load");
        assert_eq!(manifest.len(), 0);
        assert!(manifest.is_empty());
        assert_eq!(manifest.first(), None);
    }

    #[test]
    fn missing_manifest_is_an_open_error() {
        let err = FileManifest::load("/definitely/not/here.txt").expect_err("should fail");
        match err {
            ManifestError::Open { path, .. } => assert!(path.contains("not/here.txt")),
            other => panic!("expected Open error, got {other:?}"),
        }
    }

    #[test]
    fn from_paths_preserves_order() {
        let manifest = FileManifest::from_paths(["x.sac", "y.sac"]);
        let paths: Vec<&str> = manifest.iter().collect();
        assert_eq!(paths, ["x.sac", "y.sac"]);
    }
}
