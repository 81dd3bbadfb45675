//! Command-line parsing for the map-grid tool.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the normalization/interpolation code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::InterpMethod;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "maplab", version, about = "ECU map grid builder (tidy CSV → dense surface)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse a tidy map CSV, build the dense grid, print diagnostics, and
    /// optionally export the payload.
    Parse(ParseArgs),
    /// Generate a mock tidy map CSV for demos and tests.
    Sample(SampleArgs),
}

/// Options for parsing and grid construction.
#[derive(Debug, Parser, Clone)]
pub struct ParseArgs {
    /// Tidy CSV with `RPM`, `Load`, `Timing` columns (case-sensitive).
    pub csv: PathBuf,

    /// Interpolation method for unobserved in-hull cells.
    #[arg(long, value_enum, default_value_t = InterpMethod::Linear)]
    pub method: InterpMethod,

    /// Write the grid payload as pretty JSON.
    #[arg(long = "export-grid", value_name = "JSON")]
    pub export_grid: Option<PathBuf>,

    /// Write the filled grid as a matrix CSV (Load rows x RPM columns).
    #[arg(long = "export-csv", value_name = "CSV")]
    pub export_csv: Option<PathBuf>,

    /// Print the filled grid as a table after the summary.
    #[arg(long)]
    pub preview: bool,

    /// Maximum data rows accepted (default 50000; env `MAPLAB_MAX_ROWS`).
    #[arg(long)]
    pub max_rows: Option<usize>,

    /// Maximum distinct values per axis (default 256; env `MAPLAB_MAX_AXIS`).
    #[arg(long)]
    pub max_axis: Option<usize>,
}

/// Options for mock-map generation.
#[derive(Debug, Parser, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    pub out: PathBuf,

    /// Lowest RPM axis value.
    #[arg(long, default_value_t = 1000.0)]
    pub rpm_min: f64,

    /// Highest RPM axis value.
    #[arg(long, default_value_t = 6000.0)]
    pub rpm_max: f64,

    /// RPM axis spacing.
    #[arg(long, default_value_t = 1000.0)]
    pub rpm_step: f64,

    /// Lowest Load axis value.
    #[arg(long, default_value_t = 20.0)]
    pub load_min: f64,

    /// Highest Load axis value.
    #[arg(long, default_value_t = 100.0)]
    pub load_max: f64,

    /// Load axis spacing.
    #[arg(long, default_value_t = 20.0)]
    pub load_step: f64,

    /// Constant timing offset (1.0 mimics a tuned map).
    #[arg(long, default_value_t = 0.0)]
    pub offset: f64,

    /// Gaussian timing noise std-dev (0 disables).
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    /// Fraction of rows emitted with a blank Timing cell.
    #[arg(long, default_value_t = 0.0)]
    pub holes: f64,

    /// RNG seed for noise/holes.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
