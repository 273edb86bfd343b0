//! The MSACS1 single-file batch container.
//!
//! A container bundles a whole validated batch (per-trace header records
//! and raw sample data) into one self-describing binary file, so a batch
//! can be re-read without re-parsing the original trace files. Layout, all
//! multi-byte fields in native byte order:
//!
//! ```text
//! char[6]  format tag = "MSACS1"
//! u32      trace count (Tr)
//! u32      samples per trace (N); 0 is reserved and rejected on read
//! u32      flags/version = 1
//! Tr × {
//!     102-byte fixed-width trace header record
//!     N × f32 raw sample values
//! }
//! ```
//!
//! There is no checksum, no compression, and no byte-order tag: this is a
//! closed-system snapshot format, not an interchange format, and readers
//! and writers must run on compatible architectures. A stored sample count
//! of 0 is reserved to mean "variable-length traces", which this codec
//! version does not represent.

pub(crate) mod record;

use std::{
    collections::TryReserveError,
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use bytes::{Buf, BufMut, BytesMut};
use snafu::{ResultExt, Snafu, ensure};

use crate::batch::TraceBatch;

/// Six-byte tag opening every container file.
pub const FORMAT_TAG: &[u8; 6] = b"MSACS1";

/// Container layout version recorded in the flags field.
pub const FORMAT_VERSION: u32 = 1;

pub(crate) const FILE_HEADER_LEN: usize = FORMAT_TAG.len() + 3 * 4;

/// Errors from reading or writing a container file.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ContainerError {
    /// The container file could not be created or written.
    #[snafu(display("Cannot write container {path}: {source}"))]
    Write {
        /// Path of the container file.
        path: String,
        /// Underlying filesystem error.
        source: std::io::Error,
    },

    /// The container file could not be opened.
    #[snafu(display("Cannot open container {path}: {source}"))]
    Open {
        /// Path of the container file.
        path: String,
        /// Underlying filesystem error.
        source: std::io::Error,
    },

    /// Reading stopped at an unexpected end of the file.
    #[snafu(display("Unexpected end of container {path}"))]
    Truncated {
        /// Path of the container file.
        path: String,
        /// Underlying read failure.
        source: std::io::Error,
    },

    /// The file does not begin with the MSACS1 tag.
    #[snafu(display("{path} is not an MSACS1 container"))]
    BadTag {
        /// Path of the rejected file.
        path: String,
    },

    /// The reserved variable-length layout (sample count 0) was found.
    #[snafu(display(
        "{path} stores traces of different lengths, which this codec version does not support"
    ))]
    VariableLength {
        /// Path of the rejected file.
        path: String,
    },

    /// Reserving memory for headers or sample buffers failed.
    #[snafu(display("Out of memory while reading container {path}: {source}"))]
    OutOfMemory {
        /// Path of the container file.
        path: String,
        /// The failed reservation.
        source: TryReserveError,
    },
}

/// Write `batch` to `path` as a fresh MSACS1 container.
///
/// Emits the fixed file header, then each trace's header record followed by
/// exactly N raw samples, in batch order. An existing file at `path` is
/// overwritten.
pub fn write_container(path: impl AsRef<Path>, batch: &TraceBatch) -> Result<(), ContainerError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let file = File::create(path).context(WriteSnafu {
        path: display.as_str(),
    })?;
    let mut out = BufWriter::new(file);

    let mut buf = BytesMut::with_capacity(FILE_HEADER_LEN);
    buf.put_slice(FORMAT_TAG);
    buf.put_u32_ne(batch.len() as u32);
    buf.put_u32_ne(batch.samples_per_trace() as u32);
    buf.put_u32_ne(FORMAT_VERSION);
    out.write_all(&buf).context(WriteSnafu {
        path: display.as_str(),
    })?;

    for (header, samples) in batch.iter() {
        buf.clear();
        buf.reserve(record::RECORD_LEN + samples.len() * 4);
        record::encode(header, &mut buf);
        for &value in samples {
            buf.put_f32_ne(value);
        }
        out.write_all(&buf).context(WriteSnafu {
            path: display.as_str(),
        })?;
    }

    out.flush().context(WriteSnafu {
        path: display.as_str(),
    })?;
    Ok(())
}

/// Read a whole MSACS1 container back into memory.
///
/// Validates the format tag and rejects the reserved sample-count-0
/// variant before allocating anything. Any short read mid-file is fatal;
/// partial state never escapes.
pub fn read_container(path: impl AsRef<Path>) -> Result<TraceBatch, ContainerError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let file = File::open(path).context(OpenSnafu {
        path: display.as_str(),
    })?;
    let mut input = BufReader::new(file);

    let head = read_file_header(&mut input, &display)?;
    ensure!(
        head.samples_per_trace != 0,
        VariableLengthSnafu {
            path: display.as_str(),
        }
    );
    let n = head.samples_per_trace;

    let mut headers = Vec::new();
    headers
        .try_reserve_exact(head.trace_count)
        .context(OutOfMemorySnafu {
            path: display.as_str(),
        })?;
    let mut samples = Vec::new();
    samples
        .try_reserve_exact(head.trace_count)
        .context(OutOfMemorySnafu {
            path: display.as_str(),
        })?;

    let mut record_buf = [0u8; record::RECORD_LEN];
    for _ in 0..head.trace_count {
        input.read_exact(&mut record_buf).context(TruncatedSnafu {
            path: display.as_str(),
        })?;
        let header = record::decode(&mut record_buf.as_slice());

        // A record claiming fewer samples than N owns only that prefix of
        // its buffer; the rest stays zero.
        let stored = (header.npts as usize).min(n);
        let mut buf: Vec<f32> = Vec::new();
        buf.try_reserve_exact(n).context(OutOfMemorySnafu {
            path: display.as_str(),
        })?;
        buf.resize(n, 0.0);

        let mut raw: Vec<u8> = Vec::new();
        raw.try_reserve_exact(stored * 4).context(OutOfMemorySnafu {
            path: display.as_str(),
        })?;
        raw.resize(stored * 4, 0);
        input.read_exact(&mut raw).context(TruncatedSnafu {
            path: display.as_str(),
        })?;
        let mut cursor = raw.as_slice();
        for slot in buf.iter_mut().take(stored) {
            *slot = cursor.get_f32_ne();
        }

        headers.push(header);
        samples.push(buf);
    }

    let dt = headers.first().map(|h| h.dt).unwrap_or(0.0);
    Ok(TraceBatch::from_parts(headers, samples, n, dt))
}

pub(crate) struct FileHeader {
    pub(crate) trace_count: usize,
    pub(crate) samples_per_trace: usize,
}

/// Read and validate the fixed container file header.
pub(crate) fn read_file_header(
    input: &mut impl Read,
    path: &str,
) -> Result<FileHeader, ContainerError> {
    let mut raw = [0u8; FILE_HEADER_LEN];
    input.read_exact(&mut raw).context(TruncatedSnafu { path })?;
    ensure!(raw[..FORMAT_TAG.len()] == *FORMAT_TAG, BadTagSnafu { path });

    let mut rest = &raw[FORMAT_TAG.len()..];
    let trace_count = rest.get_u32_ne() as usize;
    let samples_per_trace = rest.get_u32_ne() as usize;
    let _flags = rest.get_u32_ne();

    Ok(FileHeader {
        trace_count,
        samples_per_trace,
    })
}
