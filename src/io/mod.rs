//! Input/output: CSV ingest and export writers.

pub mod export;
pub mod ingest;
