//! Header-only station location peeks.
//!
//! Both probes answer "roughly where is this station?" without touching
//! sample data: one against a native trace file through the accessor seam,
//! one against an MSACS1 container. Neither allocates a sample buffer.

use std::{fs::File, io::BufReader, io::Read, path::Path};

use snafu::ResultExt;

use crate::{
    container::{self, ContainerError, record},
    source::{SourceError, TraceHandle, TraceSource, fields},
};

/// Peek one native trace file's station coordinates.
///
/// Opens the file through `source` and reads only the latitude and
/// longitude header fields. `Ok(None)` when the file carries no
/// coordinates; open and I/O failures are returned as errors.
pub fn trace_location<S: TraceSource>(
    source: &S,
    path: &str,
) -> Result<Option<(f64, f64)>, SourceError> {
    let mut handle = source.open(path)?;

    let stla = match handle.float_field(fields::LATITUDE) {
        Ok(value) => value,
        Err(e) if e.is_field_missing() => return Ok(None),
        Err(e) => return Err(e),
    };
    let stlo = match handle.float_field(fields::LONGITUDE) {
        Ok(value) => value,
        Err(e) if e.is_field_missing() => return Ok(None),
        Err(e) => return Err(e),
    };

    Ok(Some((f64::from(stla), f64::from(stlo))))
}

/// Peek a container's station coordinates without loading any sample data.
///
/// Reads the fixed container header (the tag is validated) and, only when
/// the container holds more than one trace, the first trace's header
/// record. `Ok(None)` when the container holds at most one trace or the
/// stored record is flagged as missing its coordinates.
pub fn container_location(path: impl AsRef<Path>) -> Result<Option<(f64, f64)>, ContainerError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let file = File::open(path).context(container::OpenSnafu {
        path: display.as_str(),
    })?;
    let mut input = BufReader::new(file);

    let head = container::read_file_header(&mut input, &display)?;
    if head.trace_count <= 1 {
        return Ok(None);
    }

    let mut raw = [0u8; record::RECORD_LEN];
    input.read_exact(&mut raw).context(container::TruncatedSnafu {
        path: display.as_str(),
    })?;
    let header = record::decode(&mut raw.as_slice());

    if header.no_coords {
        return Ok(None);
    }
    Ok(Some((f64::from(header.stla), f64::from(header.stlo))))
}
