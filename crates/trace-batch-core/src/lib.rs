//! Core engine for assembling consistent batches of seismic traces.
//!
//! This crate provides the foundational pieces for `trace-batch-format`:
//!
//! - A manifest loader that turns a newline-delimited list of trace-file
//!   paths into one compactly-backed, ordered path table (`manifest` module).
//! - A batch reader that pulls every listed trace through a native-format
//!   accessor, enforces a shared sampling interval, start offset, and length
//!   across the batch, and drops non-conforming traces without aborting the
//!   rest (`reader` module).
//! - The in-memory batch model with parallel header and sample arrays, plus
//!   the all-zero trace filter (`batch` module).
//! - A timezone-independent conversion from broken-down UTC calendar fields
//!   to epoch seconds (`epoch` module).
//! - The MSACS1 single-file binary container codec and header-only location
//!   probes (`container` and `probe` modules).
//!
//! Parsing the native per-file trace format is not done here: the `source`
//! module defines the accessor seam an embedding application implements on
//! top of whichever native library it uses. Everything in this crate is
//! single-threaded, synchronous, and blocking.
#![deny(missing_docs)]
pub mod batch;
pub mod container;
pub mod epoch;
pub mod manifest;
pub mod probe;
pub mod reader;
pub mod source;
