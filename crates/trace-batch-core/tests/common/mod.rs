//! Shared test support: an in-memory [`TraceSource`] double.
#![allow(dead_code)]

use std::collections::HashMap;

use trace_batch_core::source::{SourceError, TraceHandle, TraceSource, fields};

/// One fake native trace file: named header fields plus a data section.
#[derive(Debug, Clone, Default)]
pub struct TraceFile {
    pub ints: HashMap<String, i32>,
    pub floats: HashMap<String, f32>,
    pub strings: HashMap<String, String>,
    pub samples: Vec<f32>,
}

impl TraceFile {
    /// A fully-populated trace: every header field set, `npts` ramp samples,
    /// space-padded identity codes the way native files store them.
    pub fn new(npts: i32, dt: f32, b: f32) -> Self {
        let mut file = TraceFile::default();
        file.set_int(fields::NPTS, npts);
        file.set_float(fields::DELTA, dt);
        file.set_float(fields::BEGIN, b);
        file.set_int(fields::YEAR, 2020);
        file.set_int(fields::YDAY, 100);
        file.set_int(fields::HOUR, 12);
        file.set_int(fields::MIN, 30);
        file.set_int(fields::SEC, 5);
        file.set_int(fields::MSEC, 0);
        file.set_string(fields::NETWORK, "XX      ");
        file.set_string(fields::STATION, "STA     ");
        file.set_string(fields::CHANNEL, "BHZ     ");
        file.set_string(fields::LOCATION, "00      ");
        file.set_float(fields::LATITUDE, 40.0);
        file.set_float(fields::LONGITUDE, -105.0);
        file.set_float(fields::ELEVATION, 1600.0);
        file.set_float(fields::DEPTH, 0.0);
        file.set_float(fields::AZIMUTH, 0.0);
        file.set_float(fields::INCLINATION, 90.0);
        file.samples = (0..npts.max(0)).map(|i| i as f32).collect();
        file
    }

    pub fn set_int(&mut self, name: &str, value: i32) {
        self.ints.insert(name.to_string(), value);
    }

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.floats.insert(name.to_string(), value);
    }

    pub fn set_string(&mut self, name: &str, value: &str) {
        self.strings.insert(name.to_string(), value.to_string());
    }

    pub fn with_int(mut self, name: &str, value: i32) -> Self {
        self.set_int(name, value);
        self
    }

    pub fn with_float(mut self, name: &str, value: f32) -> Self {
        self.set_float(name, value);
        self
    }

    pub fn with_string(mut self, name: &str, value: &str) -> Self {
        self.set_string(name, value);
        self
    }

    pub fn with_station(self, sta: &str) -> Self {
        self.with_string(fields::STATION, sta)
    }

    pub fn with_samples(mut self, samples: Vec<f32>) -> Self {
        self.samples = samples;
        self
    }

    /// Remove a header field so reads of it fail with `FieldMissing`.
    pub fn without(mut self, name: &str) -> Self {
        self.ints.remove(name);
        self.floats.remove(name);
        self.strings.remove(name);
        self
    }
}

/// In-memory accessor mapping paths to [`TraceFile`] fixtures.
#[derive(Debug, Default)]
pub struct MemorySource {
    files: HashMap<String, TraceFile>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: &str, file: TraceFile) {
        self.files.insert(path.to_string(), file);
    }
}

pub struct MemoryHandle {
    file: TraceFile,
}

impl TraceSource for MemorySource {
    type Handle = MemoryHandle;

    fn open(&self, path: &str) -> Result<MemoryHandle, SourceError> {
        self.files
            .get(path)
            .cloned()
            .map(|file| MemoryHandle { file })
            .ok_or_else(|| SourceError::NotFound {
                path: path.to_string(),
            })
    }
}

impl TraceHandle for MemoryHandle {
    fn float_field(&mut self, name: &str) -> Result<f32, SourceError> {
        self.file
            .floats
            .get(name)
            .copied()
            .ok_or_else(|| SourceError::FieldMissing {
                name: name.to_string(),
            })
    }

    fn int_field(&mut self, name: &str) -> Result<i32, SourceError> {
        self.file
            .ints
            .get(name)
            .copied()
            .ok_or_else(|| SourceError::FieldMissing {
                name: name.to_string(),
            })
    }

    fn string_field(&mut self, name: &str) -> Result<String, SourceError> {
        self.file
            .strings
            .get(name)
            .cloned()
            .ok_or_else(|| SourceError::FieldMissing {
                name: name.to_string(),
            })
    }

    fn read_samples(&mut self, out: &mut [f32]) -> Result<usize, SourceError> {
        let count = out.len().min(self.file.samples.len());
        out[..count].copy_from_slice(&self.file.samples[..count]);
        Ok(count)
    }
}
