//! Seam to the native trace-file reader.
//!
//! Parsing the native on-disk trace format is out of scope for this crate.
//! An embedding application implements [`TraceSource`] on top of whichever
//! native library it uses; the batch reader and the location probe only ever
//! talk to these traits. The contract is deliberately narrow: open a file,
//! read header fields by name, read a bounded run of samples.

use snafu::Snafu;

/// Errors surfaced by a native trace-file accessor.
#[derive(Debug, Snafu)]
pub enum SourceError {
    /// The trace file does not exist or cannot be opened.
    #[snafu(display("Trace file not found: {path}"))]
    NotFound {
        /// Path that failed to open.
        path: String,
    },

    /// The file exists but is not in the native trace format.
    #[snafu(display("Not a native trace file: {path}"))]
    BadFormat {
        /// Path of the rejected file.
        path: String,
    },

    /// A requested header field is absent from this file.
    ///
    /// This is the soft per-field outcome: for optional fields the batch
    /// reader records a missing-flag and keeps going.
    #[snafu(display("Header field {name} is missing"))]
    FieldMissing {
        /// Name of the absent field.
        name: String,
    },

    /// Reading sample data failed partway through.
    #[snafu(display("I/O error while reading samples: {source}"))]
    Io {
        /// Underlying read failure.
        source: std::io::Error,
    },
}

impl SourceError {
    /// True for the soft per-field outcome, as opposed to open/read failures.
    pub fn is_field_missing(&self) -> bool {
        matches!(self, SourceError::FieldMissing { .. })
    }
}

/// Opens native trace files for header and sample access.
pub trait TraceSource {
    /// Access to one opened trace file.
    type Handle: TraceHandle;

    /// Open the trace file at `path`, positioned at its first sample.
    fn open(&self, path: &str) -> Result<Self::Handle, SourceError>;
}

/// Field-by-name and bounded-sample access to one opened trace file.
pub trait TraceHandle {
    /// Read a named floating-point header field.
    fn float_field(&mut self, name: &str) -> Result<f32, SourceError>;

    /// Read a named integer header field.
    fn int_field(&mut self, name: &str) -> Result<i32, SourceError>;

    /// Read a named string header field.
    ///
    /// Native fields are space-padded to [`CODE_CAPACITY`] bytes;
    /// implementations return the raw padded content and leave trimming to
    /// the caller.
    ///
    /// [`CODE_CAPACITY`]: crate::batch::CODE_CAPACITY
    fn string_field(&mut self, name: &str) -> Result<String, SourceError>;

    /// Read up to `out.len()` samples from the start of the data section
    /// into `out`, returning how many were written.
    fn read_samples(&mut self, out: &mut [f32]) -> Result<usize, SourceError>;
}

/// Native header field names understood by the batch reader.
///
/// These follow the native trace-file header vocabulary so a source
/// implementation can forward them to its library unchanged.
pub mod fields {
    /// Number of samples in the data section.
    pub const NPTS: &str = "npts";
    /// Sampling interval, seconds.
    pub const DELTA: &str = "delta";
    /// Time of the first sample relative to the reference origin, seconds.
    pub const BEGIN: &str = "b";
    /// Calendar year of the reference time.
    pub const YEAR: &str = "nzyear";
    /// 1-based day of the year.
    pub const YDAY: &str = "nzjday";
    /// Hour of day.
    pub const HOUR: &str = "nzhour";
    /// Minute of the hour.
    pub const MIN: &str = "nzmin";
    /// Second of the minute.
    pub const SEC: &str = "nzsec";
    /// Millisecond of the second.
    pub const MSEC: &str = "nzmsec";
    /// Network code.
    pub const NETWORK: &str = "knetwk";
    /// Station code.
    pub const STATION: &str = "kstnm";
    /// Channel code.
    pub const CHANNEL: &str = "kcmpnm";
    /// Location (hole) code.
    pub const LOCATION: &str = "khole";
    /// Station latitude, degrees.
    pub const LATITUDE: &str = "stla";
    /// Station longitude, degrees.
    pub const LONGITUDE: &str = "stlo";
    /// Station elevation, meters.
    pub const ELEVATION: &str = "stel";
    /// Station depth below surface, meters.
    pub const DEPTH: &str = "stdp";
    /// Component azimuth, degrees clockwise from north.
    pub const AZIMUTH: &str = "cmpaz";
    /// Component inclination, degrees from vertical.
    pub const INCLINATION: &str = "cmpinc";
}
