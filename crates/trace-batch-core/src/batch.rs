//! Per-trace metadata and the in-memory batch model.
//!
//! A [`TraceBatch`] holds headers and sample buffers as parallel arrays
//! associated by index: entry `i` of each array describes the same trace.
//! Buffers all share one length, every header agrees with the batch sampling
//! interval within the reader tolerance, and the batch exclusively owns all
//! of it: dropping the batch releases every buffer and header at once.

use chrono::{DateTime, Utc};
use log::warn;

/// Capacity of each identity field in the fixed-width container record.
pub const CODE_CAPACITY: usize = 8;

/// Sentinel stored by native trace files for an unset location code.
pub(crate) const UNDEFINED_CODE: &str = "-12345";

/// Per-trace metadata mirrored from the native trace-file header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceHeader {
    /// Number of samples in the trace as kept in the batch.
    pub npts: u32,
    /// Sampling interval in seconds. Positive in any valid header.
    pub dt: f32,
    /// Time of the first sample, seconds relative to the reference origin.
    pub b: f32,
    /// Calendar year of the trace start (for example 2020).
    pub year: i32,
    /// 1-based day of the year.
    pub yday: i32,
    /// Hour of day.
    pub hour: i32,
    /// Minute of the hour.
    pub min: i32,
    /// Second of the minute.
    pub sec: i32,
    /// Millisecond of the second.
    pub msec: i32,
    /// Derived start time, signed seconds since the Unix epoch.
    pub t: i64,
    /// Network code; empty when the source field was unset.
    pub net: String,
    /// Station code.
    pub sta: String,
    /// Channel code.
    pub chn: String,
    /// Location code; the native undefined sentinel is normalized to empty.
    pub loc: String,
    /// Station latitude, degrees.
    pub stla: f32,
    /// Station longitude, degrees.
    pub stlo: f32,
    /// Station elevation, meters.
    pub stel: f32,
    /// Station depth below surface, meters.
    pub stdp: f32,
    /// Component azimuth, degrees clockwise from north.
    pub cmpaz: f32,
    /// Component inclination, degrees from vertical.
    pub cmpinc: f32,
    /// Set when the source carried no station coordinates.
    pub no_coords: bool,
    /// Set when the source carried no component orientation.
    pub no_orient: bool,
}

impl TraceHeader {
    /// The `NET.STA.LOC.CHN` identifier used in diagnostics.
    pub fn station_code(&self) -> String {
        format!("{}.{}.{}.{}", self.net, self.sta, self.loc, self.chn)
    }

    /// Trace start as a UTC instant, combining the derived epoch seconds
    /// with the millisecond field.
    ///
    /// `None` when the millisecond field is out of range or the timestamp
    /// falls outside chrono's representable span.
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        let millis = u32::try_from(self.msec).ok().filter(|ms| *ms < 1000)?;
        DateTime::from_timestamp(self.t, millis * 1_000_000)
    }
}

/// An ordered set of equal-length traces and their headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceBatch {
    headers: Vec<TraceHeader>,
    samples: Vec<Vec<f32>>,
    samples_per_trace: usize,
    dt: f32,
}

impl TraceBatch {
    /// Assemble a batch from parallel header and sample arrays.
    ///
    /// # Panics
    ///
    /// Panics when the arrays differ in length or any buffer is not
    /// `samples_per_trace` long.
    pub fn from_parts(
        headers: Vec<TraceHeader>,
        samples: Vec<Vec<f32>>,
        samples_per_trace: usize,
        dt: f32,
    ) -> Self {
        assert_eq!(
            headers.len(),
            samples.len(),
            "headers and sample buffers must pair up"
        );
        assert!(
            samples.iter().all(|buf| buf.len() == samples_per_trace),
            "every sample buffer must have the batch length"
        );
        Self {
            headers,
            samples,
            samples_per_trace,
            dt,
        }
    }

    /// Number of traces in the batch.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// True when no traces survived reading or filtering.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Samples per trace (the batch length N).
    pub fn samples_per_trace(&self) -> usize {
        self.samples_per_trace
    }

    /// Batch reference sampling interval, seconds.
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Headers in batch order.
    pub fn headers(&self) -> &[TraceHeader] {
        &self.headers
    }

    /// Sample buffers in batch order, parallel to [`headers`](Self::headers).
    pub fn samples(&self) -> &[Vec<f32>] {
        &self.samples
    }

    /// Iterate `(header, samples)` pairs in batch order.
    pub fn iter(&self) -> impl Iterator<Item = (&TraceHeader, &[f32])> + '_ {
        self.headers
            .iter()
            .zip(self.samples.iter().map(Vec::as_slice))
    }

    /// Drop every trace whose sample buffer is identically zero.
    ///
    /// Survivors keep their relative order and stay paired with their
    /// headers; no new sample buffers are allocated. One notice is logged
    /// per removed trace, naming its station identity and calendar start.
    /// Returns the number of traces removed.
    pub fn remove_zero_traces(&mut self) -> usize {
        let before = self.headers.len();
        let headers = std::mem::take(&mut self.headers);
        let samples = std::mem::take(&mut self.samples);

        let (headers, samples) = headers
            .into_iter()
            .zip(samples)
            .filter(|(header, buf)| {
                let keep = buf.iter().any(|&v| v != 0.0);
                if !keep {
                    warn!(
                        "removing {} at {:04}-{:03} {:02}:{:02}:{:02}, all samples are zero",
                        header.station_code(),
                        header.year,
                        header.yday,
                        header.hour,
                        header.min,
                        header.sec,
                    );
                }
                keep
            })
            .unzip();

        self.headers = headers;
        self.samples = samples;
        before - self.headers.len()
    }
}
