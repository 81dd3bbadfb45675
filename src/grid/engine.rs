//! Dense-fill interpolation over the axis cross product.
//!
//! For every (rpm, load) cell of the derived grid:
//!
//! 1. an exact observation at that key passes through verbatim (the
//!    interpolant is never allowed to overwrite a known sample);
//! 2. otherwise, inside the convex hull of the scatter, the configured
//!    `InterpMethod` fills the cell (baseline: barycentric interpolation
//!    over a Delaunay triangulation);
//! 3. otherwise (outside the hull) the cell takes the timing of its
//!    nearest observed neighbor by Euclidean distance in raw (rpm, load)
//!    space. Nearest-neighbor extension deliberately trades boundary
//!    smoothness for bounded output: linear/cubic extrapolation can swing
//!    far outside the observed timing range.
//!
//! Triangulation and hull tests run in unit-scaled coordinates so the
//! predicates stay conditioned when RPM spans thousands and Load tens;
//! barycentric weights are affine-invariant, so the interpolated values
//! do not depend on the scaling. Nearest-neighbor distances use raw
//! coordinates.
//!
//! A scatter that is collinear (but survived the axis checks, i.e. a
//! diagonal line) cannot be triangulated; the engine recovers by
//! interpolating linearly along the line for on-line targets and falling
//! back to nearest-neighbor for everything else.

use nalgebra::Point2;
use rayon::prelude::*;

use crate::domain::{
    FillStats, GridResult, GridShape, InterpMethod, Limits, MapSurface, Observation,
    ObservationSet,
};
use crate::error::MapError;
use crate::grid::axes::derive_axes;
use crate::math::{Line2, TriangleLocator, collinear_line, triangulate};

/// Build the dense surface payload from a normalized observation set.
pub fn build_surface(
    set: &ObservationSet,
    method: InterpMethod,
    limits: &Limits,
) -> Result<GridResult, MapError> {
    let axes = derive_axes(set, limits)?;
    let scatter = set.observations();
    let filler = CellFiller::new(&scatter, method)?;

    let rows = axes.load.len();
    let cols = axes.rpm.len();

    // Each load row is independent; rayon preserves output order.
    let filled: Vec<(Vec<f64>, FillStats)> = axes
        .load
        .par_iter()
        .map(|&load| {
            let mut row = Vec::with_capacity(cols);
            let mut stats = FillStats::default();
            for &rpm in &axes.rpm {
                if let Some(timing) = set.timing_at(rpm, load) {
                    row.push(timing);
                    stats.cells_exact += 1;
                } else {
                    let (timing, kind) = filler.fill(rpm, load);
                    row.push(timing);
                    match kind {
                        FillKind::Interpolated => stats.cells_interpolated += 1,
                        FillKind::Extrapolated => stats.cells_extrapolated += 1,
                    }
                }
            }
            (row, stats)
        })
        .collect();

    let mut z_grid_flat = Vec::with_capacity(rows * cols);
    let mut fill = FillStats::default();
    for (row, stats) in filled {
        z_grid_flat.extend(row);
        fill.cells_exact += stats.cells_exact;
        fill.cells_interpolated += stats.cells_interpolated;
        fill.cells_extrapolated += stats.cells_extrapolated;
    }

    Ok(GridResult {
        surface: MapSurface {
            rpm_axis: axes.rpm,
            load_axis: axes.load,
            z_grid_flat,
            shape: GridShape { rows, cols },
            total_points: rows * cols,
        },
        fill,
        collinear_fallback: filler.is_line_fallback(),
    })
}

#[derive(Debug, Clone, Copy)]
enum FillKind {
    Interpolated,
    Extrapolated,
}

/// Affine map from raw (rpm, load) space onto the unit square.
#[derive(Debug, Clone, Copy)]
struct UnitScale {
    x0: f64,
    y0: f64,
    inv_dx: f64,
    inv_dy: f64,
}

impl UnitScale {
    fn new(scatter: &[Observation]) -> Self {
        let mut min = (f64::INFINITY, f64::INFINITY);
        let mut max = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for o in scatter {
            min.0 = min.0.min(o.rpm);
            min.1 = min.1.min(o.load);
            max.0 = max.0.max(o.rpm);
            max.1 = max.1.max(o.load);
        }
        // Axis checks guarantee at least two distinct values per axis, so
        // both extents are strictly positive.
        Self {
            x0: min.0,
            y0: min.1,
            inv_dx: 1.0 / (max.0 - min.0),
            inv_dy: 1.0 / (max.1 - min.1),
        }
    }

    fn to_unit(&self, rpm: f64, load: f64) -> Point2<f64> {
        Point2::new((rpm - self.x0) * self.inv_dx, (load - self.y0) * self.inv_dy)
    }
}

enum FillMode {
    /// Barycentric interpolation inside the hull.
    Triangulated(TriangleLocator),
    /// Collinear scatter: 1D linear interpolation along the line.
    Line {
        line: Line2,
        /// (line parameter, scatter index), sorted by parameter.
        ordered: Vec<(f64, usize)>,
    },
    /// `InterpMethod::Nearest`: nearest observed neighbor everywhere.
    NearestOnly,
}

struct CellFiller<'a> {
    scatter: &'a [Observation],
    scale: UnitScale,
    mode: FillMode,
}

impl<'a> CellFiller<'a> {
    fn new(scatter: &'a [Observation], method: InterpMethod) -> Result<Self, MapError> {
        let scale = UnitScale::new(scatter);

        let mode = match method {
            InterpMethod::Nearest => FillMode::NearestOnly,
            InterpMethod::Linear => {
                let unit: Vec<Point2<f64>> = scatter
                    .iter()
                    .map(|o| scale.to_unit(o.rpm, o.load))
                    .collect();
                match triangulate(&unit) {
                    Some(tri) => FillMode::Triangulated(TriangleLocator::new(tri)),
                    None => {
                        let Some(line) = collinear_line(&unit) else {
                            return Err(MapError::DegenerateGeometry {
                                reason: "scatter could not be triangulated".to_string(),
                            });
                        };
                        let mut ordered: Vec<(f64, usize)> = unit
                            .iter()
                            .enumerate()
                            .map(|(i, &p)| (line.param(p), i))
                            .collect();
                        ordered.sort_by(|a, b| a.0.total_cmp(&b.0));
                        FillMode::Line { line, ordered }
                    }
                }
            }
        };

        Ok(Self {
            scatter,
            scale,
            mode,
        })
    }

    fn is_line_fallback(&self) -> bool {
        matches!(self.mode, FillMode::Line { .. })
    }

    fn fill(&self, rpm: f64, load: f64) -> (f64, FillKind) {
        match &self.mode {
            FillMode::Triangulated(locator) => {
                let p = self.scale.to_unit(rpm, load);
                match locator.locate(p) {
                    Some((t, w)) => {
                        let z = w[0] * self.scatter[t[0]].timing
                            + w[1] * self.scatter[t[1]].timing
                            + w[2] * self.scatter[t[2]].timing;
                        (z, FillKind::Interpolated)
                    }
                    None => (self.nearest(rpm, load), FillKind::Extrapolated),
                }
            }
            FillMode::Line { line, ordered } => {
                let p = self.scale.to_unit(rpm, load);
                let tol = line.span * 1e-9;
                if line.distance(p) > tol {
                    return (self.nearest(rpm, load), FillKind::Extrapolated);
                }
                let t = line.param(p);
                let first = ordered[0].0;
                let last = ordered[ordered.len() - 1].0;
                if t < first - tol || t > last + tol {
                    return (self.nearest(rpm, load), FillKind::Extrapolated);
                }
                (self.lerp_along(ordered, t), FillKind::Interpolated)
            }
            FillMode::NearestOnly => (self.nearest(rpm, load), FillKind::Interpolated),
        }
    }

    /// Linear interpolation between the bracketing scatter points on the line.
    fn lerp_along(&self, ordered: &[(f64, usize)], t: f64) -> f64 {
        let hi = ordered.partition_point(|&(param, _)| param < t);
        if hi == 0 {
            return self.scatter[ordered[0].1].timing;
        }
        if hi >= ordered.len() {
            return self.scatter[ordered[ordered.len() - 1].1].timing;
        }
        let (t0, i0) = ordered[hi - 1];
        let (t1, i1) = ordered[hi];
        let z0 = self.scatter[i0].timing;
        let z1 = self.scatter[i1].timing;
        if t1 <= t0 {
            return z0;
        }
        let u = (t - t0) / (t1 - t0);
        z0 + u * (z1 - z0)
    }

    /// Nearest observed neighbor in raw (rpm, load) space; the first point
    /// in scatter order wins ties, which keeps output deterministic.
    fn nearest(&self, rpm: f64, load: f64) -> f64 {
        let mut best_d2 = f64::INFINITY;
        let mut best = 0usize;
        for (i, o) in self.scatter.iter().enumerate() {
            let dr = o.rpm - rpm;
            let dl = o.load - load;
            let d2 = dr * dr + dl * dl;
            if d2 < best_d2 {
                best_d2 = d2;
                best = i;
            }
        }
        self.scatter[best].timing
    }
}
