//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory while normalizing and filling the grid
//! - exported to JSON for the visualization layer
//! - reloaded later for diffing or downstream analysis

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which independent axis a value belongs to (for error reporting).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisKind {
    Rpm,
    Load,
}

impl std::fmt::Display for AxisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AxisKind::Rpm => write!(f, "RPM"),
            AxisKind::Load => write!(f, "Load"),
        }
    }
}

/// One tidy row after numeric coercion.
///
/// `None` means the cell was missing, non-numeric, or non-finite (explicit
/// `NaN` tokens coerce to `None` as well). The source line number is kept so
/// row-level diagnostics can point at the offending input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapRow {
    pub line: usize,
    pub rpm: Option<f64>,
    pub load: Option<f64>,
    pub timing: Option<f64>,
}

/// A unique (rpm, load) key in the observation map.
///
/// Both components are finite by construction (`GridKey::new` rejects
/// anything else), which makes `f64::total_cmp` a safe total order. `-0.0`
/// is normalized to `0.0` on construction so the two zeros cannot show up
/// as distinct axis values.
#[derive(Debug, Clone, Copy)]
pub struct GridKey {
    rpm: f64,
    load: f64,
}

impl GridKey {
    pub fn new(rpm: f64, load: f64) -> Option<Self> {
        if !(rpm.is_finite() && load.is_finite()) {
            return None;
        }
        let rpm = if rpm == 0.0 { 0.0 } else { rpm };
        let load = if load == 0.0 { 0.0 } else { load };
        Some(Self { rpm, load })
    }

    pub fn rpm(&self) -> f64 {
        self.rpm
    }

    pub fn load(&self) -> f64 {
        self.load
    }
}

impl PartialEq for GridKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for GridKey {}

impl PartialOrd for GridKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GridKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rpm
            .total_cmp(&other.rpm)
            .then(self.load.total_cmp(&other.load))
    }
}

/// One normalized observation: a (rpm, load) site and its timing value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub rpm: f64,
    pub load: f64,
    pub timing: f64,
}

/// The canonical set of unique (rpm, load) → timing observations.
///
/// Backed by a `BTreeMap` so iteration order (rpm-major, load-minor) is
/// deterministic; identical inputs always produce identical scatter order
/// and therefore byte-identical grids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationSet {
    values: BTreeMap<GridKey, f64>,
}

impl ObservationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert with last-write-wins semantics.
    ///
    /// Returns the previous timing value when the key was already present.
    pub fn insert(&mut self, key: GridKey, timing: f64) -> Option<f64> {
        self.values.insert(key, timing)
    }

    pub fn get(&self, key: &GridKey) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Timing at an exact (rpm, load) site, if one was observed.
    pub fn timing_at(&self, rpm: f64, load: f64) -> Option<f64> {
        GridKey::new(rpm, load).and_then(|key| self.get(&key))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, GridKey, f64> {
        self.values.iter()
    }

    /// The scatter point cloud handed to interpolation, in key order.
    pub fn observations(&self) -> Vec<Observation> {
        self.values
            .iter()
            .map(|(k, &timing)| Observation {
                rpm: k.rpm(),
                load: k.load(),
                timing,
            })
            .collect()
    }
}

/// A row-level problem encountered during normalization (never fatal).
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Diagnostic counters from normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeCounts {
    /// Total data rows seen (valid or not).
    pub rows_seen: usize,
    /// Rows dropped because Timing was missing/blank/non-numeric.
    pub rows_dropped_missing_value: usize,
    /// Rows whose (RPM, Load) key replaced an earlier observation.
    pub rows_deduplicated: usize,
}

/// Normalization output: observations + counters + row diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedMap {
    pub observations: ObservationSet,
    pub counts: NormalizeCounts,
    /// Rows whose RPM or Load failed coercion (skipped, not fatal).
    pub row_errors: Vec<RowError>,
}

/// Grid dimensions: `rows` indexes the Load axis, `cols` the RPM axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridShape {
    pub rows: usize,
    pub cols: usize,
}

/// The dense-grid response payload.
///
/// `z_grid_flat` is row-major by load then rpm:
/// `z_grid_flat[j * cols + i]` is the timing at `(rpm_axis[i], load_axis[j])`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSurface {
    pub rpm_axis: Vec<f64>,
    pub load_axis: Vec<f64>,
    pub z_grid_flat: Vec<f64>,
    pub shape: GridShape,
    pub total_points: usize,
}

impl MapSurface {
    /// Timing at grid cell (rpm index `i`, load index `j`).
    pub fn at(&self, i: usize, j: usize) -> f64 {
        self.z_grid_flat[j * self.shape.cols + i]
    }
}

/// How each dense-fill cell was produced (diagnostics, not payload).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillStats {
    /// Cells backed by an exact observation.
    pub cells_exact: usize,
    /// Cells filled by in-hull interpolation.
    pub cells_interpolated: usize,
    /// Cells outside the convex hull, filled by nearest-neighbor extension.
    pub cells_extrapolated: usize,
}

/// Grid construction output: the payload plus fill diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct GridResult {
    pub surface: MapSurface,
    pub fill: FillStats,
    /// The scatter was collinear and the engine recovered via 1D linear
    /// interpolation along the line (plus nearest-neighbor off the line).
    pub collinear_fallback: bool,
}

/// Interpolation strategy for unobserved in-hull cells.
///
/// The strategy only affects cells with no exact observation; observed
/// sites always pass through verbatim, and cells outside the convex hull
/// always use nearest-neighbor extension regardless of strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InterpMethod {
    /// Piecewise-linear barycentric interpolation over a Delaunay
    /// triangulation of the scatter (the baseline).
    Linear,
    /// Nearest observed neighbor, everywhere.
    Nearest,
}

impl InterpMethod {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            InterpMethod::Linear => "linear (barycentric)",
            InterpMethod::Nearest => "nearest-neighbor",
        }
    }
}

/// One generated tidy CSV row; `timing: None` emits a blank cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TidyRow {
    pub rpm: f64,
    pub load: f64,
    pub timing: Option<f64>,
}

/// Resource ceilings enforced before triangulation/interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of data rows accepted by ingest.
    pub max_rows: usize,
    /// Maximum distinct values per axis.
    pub max_axis: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_rows: 50_000,
            max_axis: 256,
        }
    }
}

/// A full `maplab parse` run configuration (CLI flags plus defaults).
#[derive(Debug, Clone)]
pub struct ParseConfig {
    pub csv_path: PathBuf,
    pub method: InterpMethod,
    pub limits: Limits,

    pub export_grid: Option<PathBuf>,
    pub export_csv: Option<PathBuf>,
    /// Print the filled grid as a table after the summary.
    pub preview: bool,
}

/// A `maplab sample` run configuration.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub out_path: PathBuf,

    pub rpm_min: f64,
    pub rpm_max: f64,
    pub rpm_step: f64,
    pub load_min: f64,
    pub load_max: f64,
    pub load_step: f64,

    /// Constant timing offset (a "tuned" map is the stock map plus 1.0).
    pub offset: f64,
    /// Std-dev of Gaussian timing noise; 0 disables noise.
    pub noise_sigma: f64,
    /// Fraction of rows emitted with a blank Timing cell.
    pub hole_fraction: f64,
    pub seed: u64,
}
