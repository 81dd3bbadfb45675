//! CSV ingest and tidy-row normalization.
//!
//! This module turns a tidy map CSV (columns `RPM`, `Load`, `Timing`) into
//! the canonical set of unique (RPM, Load) → Timing observations.
//!
//! Design goals:
//! - **Strict schema** for the required columns (clear errors + exit code 2)
//! - **Row-level tolerance**: a malformed row is dropped and counted, never
//!   fatal on its own
//! - **Deterministic behavior**: last-write-wins on duplicate keys, no
//!   hidden reordering
//! - **Separation of concerns**: no interpolation logic here; where the
//!   rows come from (file, upload, in-memory table) is the caller's concern

use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{GridKey, IngestedMap, Limits, MapRow, NormalizeCounts, ObservationSet, RowError};
use crate::error::MapError;

/// Required tidy-table column names. Matching is case-sensitive: `rpm` is
/// not a substitute for `RPM`, matching the upstream map exports.
pub const COL_RPM: &str = "RPM";
pub const COL_LOAD: &str = "Load";
pub const COL_TIMING: &str = "Timing";

#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    rpm: usize,
    load: usize,
    timing: usize,
}

/// Read tidy rows from a CSV file on disk.
pub fn load_map_rows(path: &Path, limits: &Limits) -> Result<Vec<MapRow>, MapError> {
    let file = File::open(path)
        .map_err(|e| MapError::io(format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_map_rows(file, limits)
}

/// Read tidy rows from any reader (file upload handlers hand us these).
///
/// Numeric coercion happens here: each cell becomes `Some(value)` only when
/// it parses to a finite float. Explicit `NaN`/`inf` tokens parse but are
/// rejected by the finiteness filter, so they coerce to `None` like any
/// other unusable cell.
pub fn read_map_rows<R: std::io::Read>(reader: R, limits: &Limits) -> Result<Vec<MapRow>, MapError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| MapError::Csv {
            context: format!("Failed to read CSV headers: {e}"),
        })?
        .clone();

    let columns = resolve_columns(&headers)?;

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2 because records() starts after the header row and CSV line
        // numbers are 1-based.
        let line = idx + 2;

        if rows.len() >= limits.max_rows {
            return Err(MapError::InputTooLarge {
                what: "data rows",
                limit: limits.max_rows,
                actual: rows.len() + 1,
            });
        }

        match result {
            Ok(record) => rows.push(MapRow {
                line,
                rpm: parse_cell(&record, columns.rpm),
                load: parse_cell(&record, columns.load),
                timing: parse_cell(&record, columns.timing),
            }),
            // A structurally broken record is just a row with no usable
            // cells; normalization will count and report it.
            Err(_) => rows.push(MapRow {
                line,
                rpm: None,
                load: None,
                timing: None,
            }),
        }
    }

    Ok(rows)
}

/// Fold coerced rows into the canonical observation set.
///
/// Contract (the tidy-table normalizer):
/// - RPM or Load unusable → the row is skipped and recorded as a row error
/// - Timing unusable → the row is dropped and `rows_dropped_missing_value`
///   increments; this is expected input, not an error
/// - a duplicate (RPM, Load) key overwrites the earlier timing
///   (last-write-wins) and `rows_deduplicated` increments
/// - zero surviving observations → `EmptyInput`
pub fn normalize_rows<I>(rows: I) -> Result<IngestedMap, MapError>
where
    I: IntoIterator<Item = MapRow>,
{
    let mut observations = ObservationSet::new();
    let mut counts = NormalizeCounts::default();
    let mut row_errors = Vec::new();

    for row in rows {
        counts.rows_seen += 1;

        let (rpm, load) = match (row.rpm, row.load) {
            (Some(rpm), Some(load)) => (rpm, load),
            (rpm, load) => {
                row_errors.push(RowError {
                    line: row.line,
                    message: describe_bad_key(rpm.is_none(), load.is_none()),
                });
                continue;
            }
        };

        let Some(timing) = row.timing else {
            counts.rows_dropped_missing_value += 1;
            continue;
        };

        // Coercion already guarantees finiteness, so key construction
        // cannot fail; the guard keeps the invariant local.
        let Some(key) = GridKey::new(rpm, load) else {
            row_errors.push(RowError {
                line: row.line,
                message: "Non-finite RPM/Load value.".to_string(),
            });
            continue;
        };

        if observations.insert(key, timing).is_some() {
            counts.rows_deduplicated += 1;
        }
    }

    if observations.is_empty() {
        return Err(MapError::EmptyInput);
    }

    Ok(IngestedMap {
        observations,
        counts,
        row_errors,
    })
}

fn describe_bad_key(rpm_bad: bool, load_bad: bool) -> String {
    match (rpm_bad, load_bad) {
        (true, true) => "Missing or non-numeric RPM and Load.".to_string(),
        (true, false) => "Missing or non-numeric RPM.".to_string(),
        _ => "Missing or non-numeric Load.".to_string(),
    }
}

fn resolve_columns(headers: &StringRecord) -> Result<ColumnIndex, MapError> {
    let position = |name: &str| headers.iter().position(|h| clean_header(h) == name);

    let found = || headers.iter().map(|h| clean_header(h).to_string()).collect();

    let Some(rpm) = position(COL_RPM) else {
        return Err(MapError::MissingColumn { column: COL_RPM, found: found() });
    };
    let Some(load) = position(COL_LOAD) else {
        return Err(MapError::MissingColumn { column: COL_LOAD, found: found() });
    };
    let Some(timing) = position(COL_TIMING) else {
        return Err(MapError::MissingColumn { column: COL_TIMING, found: found() });
    };

    Ok(ColumnIndex { rpm, load, timing })
}

fn clean_header(name: &str) -> &str {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on
    // the first header (e.g. "﻿RPM"). If we don't strip it, schema
    // validation will incorrectly report a missing column.
    name.trim().trim_start_matches('\u{feff}')
}

fn parse_cell(record: &StringRecord, idx: usize) -> Option<f64> {
    let s = record.get(idx).map(str::trim).filter(|s| !s.is_empty())?;
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn rows_of(csv: &str) -> Result<Vec<MapRow>, MapError> {
        read_map_rows(Cursor::new(csv.to_string()), &Limits::default())
    }

    fn ingest(csv: &str) -> Result<IngestedMap, MapError> {
        normalize_rows(rows_of(csv)?)
    }

    #[test]
    fn parses_a_clean_map() {
        let map = ingest(
            "RPM,Load,Timing\n1000,20,3.0\n2000,20,4.0\n1000,40,5.0\n2000,40,6.0\n",
        )
        .unwrap();
        assert_eq!(map.observations.len(), 4);
        assert_eq!(map.counts.rows_seen, 4);
        assert_eq!(map.counts.rows_dropped_missing_value, 0);
        assert_eq!(map.counts.rows_deduplicated, 0);
        assert!(map.row_errors.is_empty());
        assert_eq!(map.observations.timing_at(2000.0, 40.0), Some(6.0));
    }

    #[test]
    fn column_names_are_case_sensitive() {
        let err = ingest("rpm,Load,Timing\n1000,20,3.0\n").unwrap_err();
        assert!(matches!(err, MapError::MissingColumn { column: "RPM", .. }));
    }

    #[test]
    fn missing_column_reports_what_was_found() {
        let err = ingest("X,Y,Z\n1,2,3\n").unwrap_err();
        let MapError::MissingColumn { column, found } = err else {
            panic!("expected MissingColumn");
        };
        assert_eq!(column, "RPM");
        assert_eq!(found, vec!["X", "Y", "Z"]);
    }

    #[test]
    fn bom_on_first_header_is_stripped() {
        let map = ingest("\u{feff}RPM,Load,Timing\n1000,20,3.0\n2000,40,4.0\n").unwrap();
        assert_eq!(map.observations.len(), 2);
    }

    #[test]
    fn extra_columns_are_ignored() {
        let map = ingest("RPM,Load,Timing,Notes\n1000,20,3.0,ok\n2000,40,4.0,meh\n").unwrap();
        assert_eq!(map.observations.len(), 2);
    }

    #[test]
    fn non_numeric_rpm_is_a_row_error_not_fatal() {
        let map = ingest("RPM,Load,Timing\nabc,20,3.0\n1000,20,3.0\n2000,40,4.0\n").unwrap();
        assert_eq!(map.observations.len(), 2);
        assert_eq!(map.row_errors.len(), 1);
        assert_eq!(map.row_errors[0].line, 2);
        assert!(map.row_errors[0].message.contains("RPM"));
    }

    #[test]
    fn blank_and_nan_timing_rows_are_dropped_and_counted() {
        let map = ingest(
            "RPM,Load,Timing\n1000,20,3.0\n1500,20,\n1500,40,NaN\n2000,40,4.0\n",
        )
        .unwrap();
        assert_eq!(map.observations.len(), 2);
        assert_eq!(map.counts.rows_dropped_missing_value, 2);
        // Dropped rows contribute nothing: 1500 never becomes an axis value.
        assert_eq!(map.observations.timing_at(1500.0, 20.0), None);
        assert!(map.row_errors.is_empty());
    }

    #[test]
    fn duplicate_keys_take_the_later_value() {
        let map = ingest(
            "RPM,Load,Timing\n1000,20,3.0\n2000,40,4.0\n1000,20,9.5\n",
        )
        .unwrap();
        assert_eq!(map.counts.rows_deduplicated, 1);
        assert_eq!(map.observations.timing_at(1000.0, 20.0), Some(9.5));
        assert_eq!(map.observations.len(), 2);
    }

    #[test]
    fn all_rows_unusable_is_empty_input() {
        let err = ingest("RPM,Load,Timing\nx,y,z\n1000,20,\n").unwrap_err();
        assert_eq!(err, MapError::EmptyInput);
    }

    #[test]
    fn no_data_rows_is_empty_input() {
        let err = ingest("RPM,Load,Timing\n").unwrap_err();
        assert_eq!(err, MapError::EmptyInput);
    }

    #[test]
    fn short_records_lose_cells_not_the_run() {
        // flexible(true) keeps short rows; the missing Timing cell drops the
        // row, the complete rows survive.
        let map = ingest("RPM,Load,Timing\n1000,20\n1000,20,3.0\n2000,40,4.0\n").unwrap();
        assert_eq!(map.counts.rows_dropped_missing_value, 1);
        assert_eq!(map.observations.len(), 2);
    }

    #[test]
    fn row_ceiling_is_enforced() {
        let limits = Limits { max_rows: 2, max_axis: 256 };
        let csv = "RPM,Load,Timing\n1,1,1\n2,2,2\n3,3,3\n";
        let err = read_map_rows(Cursor::new(csv.to_string()), &limits).unwrap_err();
        assert!(matches!(
            err,
            MapError::InputTooLarge { what: "data rows", limit: 2, actual: 3 }
        ));
    }

    #[test]
    fn negative_and_zero_axis_values_are_valid() {
        let map = ingest("RPM,Load,Timing\n0,-5,1.0\n1000,0,2.0\n").unwrap();
        assert_eq!(map.observations.timing_at(0.0, -5.0), Some(1.0));
        assert_eq!(map.observations.timing_at(1000.0, 0.0), Some(2.0));
    }
}
