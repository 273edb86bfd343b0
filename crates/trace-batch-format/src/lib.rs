//! # trace-batch-format
//!
//! Consistent batches of equal-length seismic traces, plus the MSACS1
//! single-file binary container.
//!
//! This crate is the supported public entry point and provides a small,
//! stable surface over `trace-batch-core`: load a manifest of trace-file
//! paths, read the listed traces into a cross-validated [`TraceBatch`]
//! through any [`TraceSource`] implementation, filter all-zero traces, and
//! write or re-read the batch as one container file.
//!
//! ## Example
//!
//! ```rust,ignore
//! use trace_batch_format::prelude::*;
//!
//! let manifest = FileManifest::load("traces.lst")?;
//! let mut batch = read_batch(&my_source, &manifest, None)?;
//! batch.remove_zero_traces();
//! write_container("batch.msacs", &batch)?;
//! ```

/// Convenience prelude with the stable, supported surface.
pub mod prelude;

pub use trace_batch_core::batch::{CODE_CAPACITY, TraceBatch, TraceHeader};
pub use trace_batch_core::container::{
    ContainerError, FORMAT_TAG, FORMAT_VERSION, read_container, write_container,
};
pub use trace_batch_core::epoch::utc_epoch_seconds;
pub use trace_batch_core::manifest::{FileManifest, ManifestError};
pub use trace_batch_core::probe::{container_location, trace_location};
pub use trace_batch_core::reader::{
    BatchError, BatchMetadata, DT_RELATIVE_TOLERANCE, read_batch, read_batch_metadata,
    read_batch_native,
};
pub use trace_batch_core::source::{SourceError, TraceHandle, TraceSource, fields};
