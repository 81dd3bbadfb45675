//! Shared parse pipeline used by the CLI (and any future front-ends).
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV read -> normalize -> axis derivation + dense fill
//!
//! Front-ends then focus on presentation (printing vs serializing).

use crate::domain::{GridResult, IngestedMap, MapRow, ParseConfig};
use crate::error::MapError;
use crate::grid;
use crate::io::ingest;

/// All computed outputs of a single `maplab parse` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedMap,
    pub grid: GridResult,
}

/// Execute the full pipeline against a CSV file on disk.
pub fn run_parse(config: &ParseConfig) -> Result<RunOutput, MapError> {
    let rows = ingest::load_map_rows(&config.csv_path, &config.limits)?;
    run_parse_rows(rows, config)
}

/// Execute the pipeline against already-read rows.
///
/// This is the entry point for callers that receive rows from somewhere
/// other than the local filesystem (uploads, in-memory tables).
pub fn run_parse_rows(rows: Vec<MapRow>, config: &ParseConfig) -> Result<RunOutput, MapError> {
    let ingest = ingest::normalize_rows(rows)?;
    let grid = grid::build_surface(&ingest.observations, config.method, &config.limits)?;
    Ok(RunOutput { ingest, grid })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GridShape, InterpMethod, Limits};
    use std::path::PathBuf;

    fn config() -> ParseConfig {
        ParseConfig {
            csv_path: PathBuf::from("unused.csv"),
            method: InterpMethod::Linear,
            limits: Limits::default(),
            export_grid: None,
            export_csv: None,
            preview: false,
        }
    }

    fn row(line: usize, rpm: f64, load: f64, timing: Option<f64>) -> MapRow {
        MapRow { line, rpm: Some(rpm), load: Some(load), timing }
    }

    #[test]
    fn four_corner_map_is_fully_exact() {
        let rows = vec![
            row(2, 1000.0, 20.0, Some(3.0)),
            row(3, 2000.0, 20.0, Some(4.0)),
            row(4, 1000.0, 40.0, Some(5.0)),
            row(5, 2000.0, 40.0, Some(6.0)),
        ];
        let run = run_parse_rows(rows, &config()).unwrap();
        let s = &run.grid.surface;
        assert_eq!(s.rpm_axis, vec![1000.0, 2000.0]);
        assert_eq!(s.load_axis, vec![20.0, 40.0]);
        assert_eq!(s.shape, GridShape { rows: 2, cols: 2 });
        assert_eq!(s.z_grid_flat, vec![3.0, 4.0, 5.0, 6.0]);
        assert_eq!(s.total_points, 4);
    }

    #[test]
    fn blank_timing_row_leaves_output_unchanged() {
        let rows = vec![
            row(2, 1000.0, 20.0, Some(3.0)),
            row(3, 2000.0, 20.0, Some(4.0)),
            row(4, 1000.0, 40.0, Some(5.0)),
            row(5, 2000.0, 40.0, Some(6.0)),
        ];
        let base = run_parse_rows(rows.clone(), &config()).unwrap();

        let mut with_blank = rows;
        with_blank.push(row(6, 1500.0, 20.0, None));
        let run = run_parse_rows(with_blank, &config()).unwrap();

        assert_eq!(run.grid.surface, base.grid.surface);
        assert_eq!(run.ingest.counts.rows_dropped_missing_value, 1);
    }

    #[test]
    fn single_rpm_axis_fails_with_insufficient_axis() {
        let rows = vec![
            row(2, 1000.0, 20.0, Some(3.0)),
            row(3, 1000.0, 40.0, Some(4.0)),
            row(4, 1000.0, 60.0, Some(5.0)),
        ];
        let err = run_parse_rows(rows, &config()).unwrap_err();
        assert!(matches!(err, MapError::InsufficientAxis { .. }));
    }

    #[test]
    fn duplicate_key_yields_later_timing_in_grid() {
        let rows = vec![
            row(2, 1000.0, 20.0, Some(3.0)),
            row(3, 2000.0, 20.0, Some(4.0)),
            row(4, 1000.0, 40.0, Some(5.0)),
            row(5, 2000.0, 40.0, Some(6.0)),
            row(6, 1000.0, 20.0, Some(9.0)),
        ];
        let run = run_parse_rows(rows, &config()).unwrap();
        assert_eq!(run.ingest.counts.rows_deduplicated, 1);
        assert_eq!(run.grid.surface.at(0, 0), 9.0);
    }
}
