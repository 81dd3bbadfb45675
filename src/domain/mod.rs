//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw/coerced row types (`MapRow`) and normalization outputs
//!   (`ObservationSet`, `NormalizeCounts`, `IngestedMap`)
//! - the dense-grid payload consumed by visualization collaborators
//!   (`MapSurface`, `GridShape`)
//! - run configuration (`InterpMethod`, `Limits`, `ParseConfig`,
//!   `SampleConfig`)

pub mod types;

pub use types::*;
