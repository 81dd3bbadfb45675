//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves resource ceilings (flags > env > defaults)
//! - runs ingest + grid construction
//! - prints the report
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, ParseArgs, SampleArgs};
use crate::domain::{Limits, ParseConfig, SampleConfig};
use crate::error::MapError;

pub mod pipeline;

/// Entry point for the `maplab` binary.
pub fn run() -> Result<(), MapError> {
    // Load `.env` before resolving ceilings so MAPLAB_MAX_ROWS /
    // MAPLAB_MAX_AXIS can live next to the data being parsed.
    dotenvy::dotenv().ok();

    let cli = crate::cli::Cli::parse();
    match cli.command {
        Command::Parse(args) => handle_parse(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_parse(args: ParseArgs) -> Result<(), MapError> {
    let config = parse_config_from_args(&args)?;
    let run = pipeline::run_parse(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&config, &run.ingest, &run.grid)
    );
    if config.preview {
        println!("{}", crate::report::format_grid_preview(&run.grid.surface));
    }

    // Optional exports.
    if let Some(path) = &config.export_grid {
        crate::io::export::write_surface_json(path, &run.grid.surface)?;
    }
    if let Some(path) = &config.export_csv {
        crate::io::export::write_grid_csv(path, &run.grid.surface)?;
    }

    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), MapError> {
    let config = sample_config_from_args(&args);
    let rows = crate::data::generate_sample(&config)?;
    crate::io::export::write_tidy_csv(&config.out_path, &rows)?;
    println!("Wrote {} rows to {}", rows.len(), config.out_path.display());
    Ok(())
}

pub fn parse_config_from_args(args: &ParseArgs) -> Result<ParseConfig, MapError> {
    Ok(ParseConfig {
        csv_path: args.csv.clone(),
        method: args.method,
        limits: resolve_limits(args.max_rows, args.max_axis)?,
        export_grid: args.export_grid.clone(),
        export_csv: args.export_csv.clone(),
        preview: args.preview,
    })
}

pub fn sample_config_from_args(args: &SampleArgs) -> SampleConfig {
    SampleConfig {
        out_path: args.out.clone(),
        rpm_min: args.rpm_min,
        rpm_max: args.rpm_max,
        rpm_step: args.rpm_step,
        load_min: args.load_min,
        load_max: args.load_max,
        load_step: args.load_step,
        offset: args.offset,
        noise_sigma: args.noise,
        hole_fraction: args.holes,
        seed: args.seed,
    }
}

/// Ceiling resolution order: explicit flag, then env var, then default.
fn resolve_limits(max_rows: Option<usize>, max_axis: Option<usize>) -> Result<Limits, MapError> {
    let defaults = Limits::default();

    let max_rows = match max_rows {
        Some(v) => v,
        None => env_limit("MAPLAB_MAX_ROWS", defaults.max_rows)?,
    };
    let max_axis = match max_axis {
        Some(v) => v,
        None => env_limit("MAPLAB_MAX_AXIS", defaults.max_axis)?,
    };

    if max_rows == 0 {
        return Err(MapError::config("--max-rows must be >= 1."));
    }
    if max_axis < 2 {
        return Err(MapError::config("--max-axis must be >= 2 (a surface needs 2 values per axis)."));
    }

    Ok(Limits { max_rows, max_axis })
}

fn env_limit(key: &str, default: usize) -> Result<usize, MapError> {
    match std::env::var(key) {
        Ok(raw) => parse_limit(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_limit(key: &str, raw: &str) -> Result<usize, MapError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| MapError::config(format!("Invalid {key}='{raw}' (expected a positive integer).")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_parsing_accepts_integers_only() {
        assert_eq!(parse_limit("MAPLAB_MAX_ROWS", " 1234 ").unwrap(), 1234);
        assert!(parse_limit("MAPLAB_MAX_ROWS", "lots").is_err());
    }

    #[test]
    fn zero_ceilings_are_rejected() {
        assert!(resolve_limits(Some(0), Some(16)).is_err());
        assert!(resolve_limits(Some(100), Some(1)).is_err());
        let limits = resolve_limits(Some(100), Some(16)).unwrap();
        assert_eq!(limits.max_rows, 100);
        assert_eq!(limits.max_axis, 16);
    }
}
