//! Formatted terminal output for parse runs.

pub mod format;

pub use format::{format_grid_preview, format_run_summary};
