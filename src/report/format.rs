//! Run summary and grid preview formatting.
//!
//! We keep formatting code in one place so:
//! - the normalization/interpolation code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{GridResult, IngestedMap, MapSurface, ParseConfig};

/// How many row-level issues to list before truncating.
const MAX_ROW_ERRORS_SHOWN: usize = 5;

/// Format the full run summary (counters + axes + fill diagnostics).
pub fn format_run_summary(config: &ParseConfig, ingest: &IngestedMap, result: &GridResult) -> String {
    let mut out = String::new();
    let s = &result.surface;

    out.push_str("=== maplab - ECU Map Grid ===\n");
    out.push_str(&format!("Input: {}\n", config.csv_path.display()));
    out.push_str(&format!(
        "Rows: seen={} | dropped_missing_value={} | deduplicated={} | row_errors={}\n",
        ingest.counts.rows_seen,
        ingest.counts.rows_dropped_missing_value,
        ingest.counts.rows_deduplicated,
        ingest.row_errors.len(),
    ));
    out.push_str(&format!(
        "Axes: rpm n={} [{:.0}, {:.0}] | load n={} [{:.1}, {:.1}]\n",
        s.rpm_axis.len(),
        s.rpm_axis[0],
        s.rpm_axis[s.rpm_axis.len() - 1],
        s.load_axis.len(),
        s.load_axis[0],
        s.load_axis[s.load_axis.len() - 1],
    ));
    out.push_str(&format!(
        "Grid: {} x {} ({} points)\n",
        s.shape.rows, s.shape.cols, s.total_points
    ));

    let method = if result.collinear_fallback {
        format!("{} (collinear scatter: 1D fallback)", config.method.display_name())
    } else {
        config.method.display_name().to_string()
    };
    out.push_str(&format!("Method: {method}\n"));
    out.push_str(&format!(
        "Fill: exact={} | interpolated={} | extrapolated={}\n",
        result.fill.cells_exact, result.fill.cells_interpolated, result.fill.cells_extrapolated,
    ));

    let (z_min, z_max) = z_range(s);
    out.push_str(&format!("Timing: [{z_min:.3}, {z_max:.3}]\n"));

    if !ingest.row_errors.is_empty() {
        out.push_str("\nRow issues (skipped, not fatal):\n");
        for err in ingest.row_errors.iter().take(MAX_ROW_ERRORS_SHOWN) {
            out.push_str(&format!("- line {}: {}\n", err.line, err.message));
        }
        let hidden = ingest.row_errors.len().saturating_sub(MAX_ROW_ERRORS_SHOWN);
        if hidden > 0 {
            out.push_str(&format!("  (+{hidden} more)\n"));
        }
    }

    out
}

/// Format the filled grid as an aligned table (Load rows, RPM columns).
pub fn format_grid_preview(surface: &MapSurface) -> String {
    let mut out = String::new();

    out.push_str(&format!("{:>10}", "Load\\RPM"));
    for rpm in &surface.rpm_axis {
        out.push_str(&format!("{rpm:>10.0}"));
    }
    out.push('\n');

    for (j, load) in surface.load_axis.iter().enumerate() {
        out.push_str(&format!("{load:>10.1}"));
        for i in 0..surface.shape.cols {
            out.push_str(&format!("{:>10.3}", surface.at(i, j)));
        }
        out.push('\n');
    }

    out
}

fn z_range(surface: &MapSurface) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &z in &surface.z_grid_flat {
        min = min.min(z);
        max = max.max(z);
    }
    (min, max)
}
