//! Wrapper prelude.
//!
//! The `trace-batch-format` crate is the supported public entry point.
//! Downstream code should prefer importing from this prelude instead of
//! depending on internal core module paths.

pub use crate::{
    BatchError, BatchMetadata, ContainerError, FileManifest, ManifestError, SourceError,
    TraceBatch, TraceHandle, TraceHeader, TraceSource, container_location, read_batch,
    read_batch_metadata, read_batch_native, read_container, trace_location, write_container,
};
