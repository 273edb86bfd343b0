//! Batch reading with cross-trace consistency enforcement.
//!
//! The reader walks a [`FileManifest`] in order, pulls each trace through a
//! [`TraceSource`], and keeps only the traces that agree with the batch
//! reference values taken from the first listed file: the sampling interval
//! (within 0.1% relative), the start offset (within one sample interval),
//! and the target length. Non-conforming traces are dropped with a logged
//! warning while the rest of the batch is still processed; survivors come
//! back compacted and in manifest order.

use std::collections::TryReserveError;

use log::warn;
use snafu::{ResultExt, Snafu, ensure};

use crate::{
    batch::{TraceBatch, TraceHeader, UNDEFINED_CODE},
    epoch,
    manifest::FileManifest,
    source::{SourceError, TraceHandle, TraceSource, fields},
};

/// Relative tolerance for sampling-interval agreement across a batch.
pub const DT_RELATIVE_TOLERANCE: f32 = 0.001;

/// Errors that abort a batch read outright.
///
/// Per-trace inconsistencies (interval or start-offset mismatch, too-short
/// native traces) are not represented here: the offending trace is dropped
/// with a logged warning and the read continues.
#[derive(Debug, Snafu)]
pub enum BatchError {
    /// The manifest listed no trace files at all.
    ///
    /// Distinct from an I/O failure so callers can warn instead of failing
    /// hard.
    #[snafu(display("Nothing to read: the manifest lists no trace files"))]
    NothingToRead,

    /// The core header record (open, `npts`, `delta`, `b`) could not be read.
    ///
    /// For the first listed file this is unavoidable: without it there is no
    /// consistency reference. For later files the strictness is deliberate:
    /// a file that lists fine but then fails its core read usually points at
    /// a systemic problem rather than one bad trace.
    #[snafu(display("Cannot read header of {path}: {source}"))]
    Header {
        /// Path of the offending trace file.
        path: String,
        /// Underlying accessor failure.
        source: SourceError,
    },

    /// Sample data could not be read for a trace that passed all checks.
    #[snafu(display("Cannot read samples of {path}: {source}"))]
    Samples {
        /// Path of the offending trace file.
        path: String,
        /// Underlying accessor failure.
        source: SourceError,
    },

    /// Reserving a sample buffer failed.
    #[snafu(display("Out of memory while reading {path}: {source}"))]
    OutOfMemory {
        /// Path of the trace being read when the reservation failed.
        path: String,
        /// The failed reservation.
        source: TryReserveError,
    },
}

/// Headers and batch-level values from a metadata-only read.
#[derive(Debug, Clone)]
pub struct BatchMetadata {
    /// Surviving trace headers in manifest order.
    pub headers: Vec<TraceHeader>,
    /// The target length every surviving trace conforms to.
    pub samples_per_trace: usize,
    /// Reference sampling interval from the first listed file, seconds.
    pub dt: f32,
}

/// Read a fixed-length batch of traces.
///
/// `target_len` is the length N every trace must conform to; `None` derives
/// it from the first listed file's native length. Traces shorter than N are
/// dropped; longer ones are kept and cut at N with a logged warning. The
/// first file also provides the reference sampling interval and start
/// offset for the consistency checks.
pub fn read_batch<S: TraceSource>(
    source: &S,
    manifest: &FileManifest,
    target_len: Option<usize>,
) -> Result<TraceBatch, BatchError> {
    let (headers, samples, n, dt) = read_fixed(source, manifest, target_len, true)?;
    Ok(TraceBatch::from_parts(headers, samples, n, dt))
}

/// Read only the headers of a fixed-length batch.
///
/// Applies the same consistency checks and drop policy as [`read_batch`]
/// but never allocates or reads sample buffers.
pub fn read_batch_metadata<S: TraceSource>(
    source: &S,
    manifest: &FileManifest,
    target_len: Option<usize>,
) -> Result<BatchMetadata, BatchError> {
    let (headers, _, samples_per_trace, dt) = read_fixed(source, manifest, target_len, false)?;
    Ok(BatchMetadata {
        headers,
        samples_per_trace,
        dt,
    })
}

/// Read every listed trace at its own native length.
///
/// The first file's sampling interval is the consistency reference and
/// interval mismatches drop the trace, but unlike [`read_batch`] there is
/// no start-offset check and no truncation: each buffer is exactly as long
/// as its data section. Callers that need a uniform length homogenize the
/// result themselves.
pub fn read_batch_native<S: TraceSource>(
    source: &S,
    manifest: &FileManifest,
) -> Result<Vec<(TraceHeader, Vec<f32>)>, BatchError> {
    ensure!(!manifest.is_empty(), NothingToReadSnafu);

    let mut traces = Vec::with_capacity(manifest.len());
    let mut dt_ref: Option<f32> = None;

    for (index, path) in manifest.iter().enumerate() {
        let mut handle = source.open(path).context(HeaderSnafu { path })?;
        let core = read_core_fields(&mut handle, path)?;
        let mut header = read_aux_fields(&mut handle, &core);

        let dt1 = *dt_ref.get_or_insert(core.dt);
        if (core.dt - dt1).abs() > dt1 * DT_RELATIVE_TOLERANCE {
            warn!(
                "{path}: sampling interval {} differs from reference {dt1}, skipping trace {index}",
                core.dt
            );
            continue;
        }

        let mut buf = new_sample_buffer(core.npts, path)?;
        let count = handle
            .read_samples(&mut buf)
            .context(SamplesSnafu { path })?;
        buf.truncate(count);
        header.npts = count as u32;

        traces.push((header, buf));
    }

    Ok(traces)
}

/// Core per-file fields every mode needs before deciding anything.
struct CoreFields {
    npts: usize,
    dt: f32,
    b: f32,
}

fn read_core_fields<H: TraceHandle>(handle: &mut H, path: &str) -> Result<CoreFields, BatchError> {
    let npts = handle.int_field(fields::NPTS).context(HeaderSnafu { path })?;
    let dt = handle
        .float_field(fields::DELTA)
        .context(HeaderSnafu { path })?;
    let b = handle
        .float_field(fields::BEGIN)
        .context(HeaderSnafu { path })?;
    Ok(CoreFields {
        npts: npts.max(0) as usize,
        dt,
        b,
    })
}

/// Populate a header from the optional fields, degrading per field.
///
/// Missing identity strings become empty, missing coordinates or
/// orientation set the corresponding flag, and missing calendar fields
/// default to zero; none of these abort the read.
fn read_aux_fields<H: TraceHandle>(handle: &mut H, core: &CoreFields) -> TraceHeader {
    let mut header = TraceHeader {
        npts: core.npts as u32,
        dt: core.dt,
        b: core.b,
        ..TraceHeader::default()
    };

    header.year = handle.int_field(fields::YEAR).unwrap_or(0);
    header.yday = handle.int_field(fields::YDAY).unwrap_or(0);
    header.hour = handle.int_field(fields::HOUR).unwrap_or(0);
    header.min = handle.int_field(fields::MIN).unwrap_or(0);
    header.sec = handle.int_field(fields::SEC).unwrap_or(0);
    header.msec = handle.int_field(fields::MSEC).unwrap_or(0);

    header.net = normalize_code(&handle.string_field(fields::NETWORK).unwrap_or_default());
    header.sta = normalize_code(&handle.string_field(fields::STATION).unwrap_or_default());
    header.chn = normalize_code(&handle.string_field(fields::CHANNEL).unwrap_or_default());
    let loc = normalize_code(&handle.string_field(fields::LOCATION).unwrap_or_default());
    header.loc = if loc.starts_with(UNDEFINED_CODE) {
        String::new()
    } else {
        loc
    };

    match (
        handle.float_field(fields::LATITUDE),
        handle.float_field(fields::LONGITUDE),
    ) {
        (Ok(stla), Ok(stlo)) => {
            header.stla = stla;
            header.stlo = stlo;
        }
        _ => header.no_coords = true,
    }
    header.stel = handle.float_field(fields::ELEVATION).unwrap_or(0.0);
    header.stdp = handle.float_field(fields::DEPTH).unwrap_or(0.0);
    match (
        handle.float_field(fields::AZIMUTH),
        handle.float_field(fields::INCLINATION),
    ) {
        (Ok(cmpaz), Ok(cmpinc)) => {
            header.cmpaz = cmpaz;
            header.cmpinc = cmpinc;
        }
        _ => header.no_orient = true,
    }

    header.t = epoch::utc_epoch_seconds(
        header.year - 1900,
        header.yday,
        header.hour,
        header.min,
        header.sec,
    );

    header
}

/// Cut a space-padded native field at its content end.
fn normalize_code(raw: &str) -> String {
    let end = raw.find([' ', '\0']).unwrap_or(raw.len());
    raw[..end].to_string()
}

fn new_sample_buffer(len: usize, path: &str) -> Result<Vec<f32>, BatchError> {
    let mut buf: Vec<f32> = Vec::new();
    buf.try_reserve_exact(len)
        .context(OutOfMemorySnafu { path })?;
    buf.resize(len, 0.0);
    Ok(buf)
}

fn read_fixed<S: TraceSource>(
    source: &S,
    manifest: &FileManifest,
    target_len: Option<usize>,
    want_samples: bool,
) -> Result<(Vec<TraceHeader>, Vec<Vec<f32>>, usize, f32), BatchError> {
    let Some(first_path) = manifest.first() else {
        return NothingToReadSnafu.fail();
    };

    // Reference values come from the first listed file; nothing else can
    // supply them, so any failure here fails the whole call.
    let mut first = source
        .open(first_path)
        .context(HeaderSnafu { path: first_path })?;
    let core1 = read_core_fields(&mut first, first_path)?;
    drop(first);

    let n = target_len.unwrap_or(core1.npts);
    let dt1 = core1.dt;
    let beg1 = core1.b;

    let mut headers: Vec<TraceHeader> = Vec::new();
    headers
        .try_reserve_exact(manifest.len())
        .context(OutOfMemorySnafu { path: first_path })?;
    let mut samples: Vec<Vec<f32>> = Vec::new();
    if want_samples {
        samples
            .try_reserve_exact(manifest.len())
            .context(OutOfMemorySnafu { path: first_path })?;
    }

    for (index, path) in manifest.iter().enumerate() {
        let mut handle = source.open(path).context(HeaderSnafu { path })?;
        let core = read_core_fields(&mut handle, path)?;
        let mut header = read_aux_fields(&mut handle, &core);

        if core.npts < n {
            warn!(
                "{path}: trace is too short ({}/{n} samples), skipping trace {index}",
                core.npts
            );
            continue;
        }
        if core.npts > n {
            warn!("{path}: trace is longer than {n} samples, cutting at sample {n}");
            header.npts = n as u32;
        }
        if (core.dt - dt1).abs() > dt1 * DT_RELATIVE_TOLERANCE {
            warn!(
                "{path}: sampling interval {} differs from reference {dt1}, skipping trace {index}",
                core.dt
            );
            continue;
        }
        if (core.b - beg1).abs() > dt1 {
            warn!(
                "{path}: start offset {} differs from reference {beg1}, skipping trace {index}",
                core.b
            );
            continue;
        }

        if want_samples {
            let mut buf = new_sample_buffer(n, path)?;
            let count = handle
                .read_samples(&mut buf)
                .context(SamplesSnafu { path })?;
            if count < n {
                warn!(
                    "{path}: data section held {count} of {n} samples, skipping trace {index}"
                );
                continue;
            }
            samples.push(buf);
        }
        headers.push(header);
    }

    Ok((headers, samples, n, dt1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_code_cuts_at_padding() {
        assert_eq!(normalize_code("BHZ     "), "BHZ");
        assert_eq!(normalize_code("STA\0\0\0\0\0"), "STA");
        assert_eq!(normalize_code("ABCDEFGH"), "ABCDEFGH");
        assert_eq!(normalize_code(""), "");
    }

    #[test]
    fn normalize_code_cuts_at_first_interior_space() {
        // Padded fields never contain interior spaces; content ends at the
        // first one either way.
        assert_eq!(normalize_code("AB CD"), "AB");
    }
}
