//! Export writers: payload JSON, matrix CSV, tidy CSV.
//!
//! The JSON payload is the visualization contract; the CSV forms are meant
//! to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{MapSurface, TidyRow};
use crate::error::MapError;

/// Write the grid payload as pretty JSON.
pub fn write_surface_json(path: &Path, surface: &MapSurface) -> Result<(), MapError> {
    let file = File::create(path)
        .map_err(|e| MapError::io(format!("Failed to create grid JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, surface)
        .map_err(|e| MapError::io(format!("Failed to write grid JSON: {e}")))?;

    Ok(())
}

/// Write the filled grid as a matrix CSV: one row per Load value, one
/// column per RPM value, with both axes as headers.
pub fn write_grid_csv(path: &Path, surface: &MapSurface) -> Result<(), MapError> {
    let mut file = File::create(path)
        .map_err(|e| MapError::io(format!("Failed to create grid CSV '{}': {e}", path.display())))?;

    let io_err = |e: std::io::Error| MapError::io(format!("Failed to write grid CSV: {e}"));

    let header: Vec<String> = surface.rpm_axis.iter().map(|v| format!("{v}")).collect();
    writeln!(file, "Load,{}", header.join(",")).map_err(io_err)?;

    for (j, load) in surface.load_axis.iter().enumerate() {
        let cells: Vec<String> = (0..surface.shape.cols)
            .map(|i| format!("{}", surface.at(i, j)))
            .collect();
        writeln!(file, "{load},{}", cells.join(",")).map_err(io_err)?;
    }

    Ok(())
}

/// Write tidy rows (`RPM,Load,Timing`); a `None` timing emits a blank cell.
pub fn write_tidy_csv(path: &Path, rows: &[TidyRow]) -> Result<(), MapError> {
    let mut file = File::create(path)
        .map_err(|e| MapError::io(format!("Failed to create CSV '{}': {e}", path.display())))?;

    let io_err = |e: std::io::Error| MapError::io(format!("Failed to write CSV: {e}"));

    writeln!(file, "RPM,Load,Timing").map_err(io_err)?;
    for row in rows {
        match row.timing {
            Some(timing) => writeln!(file, "{},{},{}", row.rpm, row.load, timing).map_err(io_err)?,
            None => writeln!(file, "{},{},", row.rpm, row.load).map_err(io_err)?,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::domain::{GridShape, MapSurface};

    #[test]
    fn payload_round_trips_through_json() {
        let surface = MapSurface {
            rpm_axis: vec![1000.0, 2000.0],
            load_axis: vec![20.0, 40.0],
            z_grid_flat: vec![3.0, 4.0, 5.0, 6.0],
            shape: GridShape { rows: 2, cols: 2 },
            total_points: 4,
        };
        let json = serde_json::to_string(&surface).unwrap();
        let back: MapSurface = serde_json::from_str(&json).unwrap();
        assert_eq!(back, surface);
        // Field names are the wire contract.
        for key in ["rpm_axis", "load_axis", "z_grid_flat", "shape", "total_points", "rows", "cols"] {
            assert!(json.contains(key), "payload JSON missing `{key}`");
        }
    }
}
