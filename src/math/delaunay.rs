//! Deterministic Bowyer–Watson Delaunay triangulation.
//!
//! This is the triangulation backing piecewise-linear barycentric
//! interpolation of the scatter. Design goals mirror the rest of the
//! numerical core:
//!
//! - **Deterministic**: sites are inserted in their given (already sorted)
//!   order, and cavity edges are visited in sorted order, so the same
//!   scatter always yields the same triangle list.
//! - **Explicit failure**: a collinear scatter returns `None` and the
//!   caller decides how to recover; nothing panics.
//! - **Conditioned inputs**: callers pass unit-scaled coordinates, so the
//!   fixed epsilons in the underlying predicates are meaningful.
//!
//! The classic algorithm: seed with a super-triangle enclosing every site,
//! insert sites one at a time (re-triangulating the cavity of triangles
//! whose circumcircle contains the new site), then drop every triangle
//! still attached to a super-triangle vertex.

use std::collections::BTreeMap;

use nalgebra::{Point2, Vector2};

use crate::math::geometry::{barycentric, collinear_line, in_circumcircle, orient2d};

/// A triangulation of scatter sites. Triangle vertices index into `points`
/// and are oriented counter-clockwise.
#[derive(Debug, Clone)]
pub struct Triangulation {
    pub points: Vec<Point2<f64>>,
    pub triangles: Vec<[usize; 3]>,
}

/// Triangulate `sites` (at least 3, unique, finite, unit-scaled).
///
/// Returns `None` when the sites are collinear and no triangle exists.
pub fn triangulate(sites: &[Point2<f64>]) -> Option<Triangulation> {
    if sites.len() < 3 || collinear_line(sites).is_some() {
        return None;
    }

    let n = sites.len();
    let mut verts: Vec<Point2<f64>> = sites.to_vec();

    // Super-triangle comfortably enclosing the bounding box.
    let (min, max) = bounds(sites);
    let cx = (min.x + max.x) / 2.0;
    let cy = (min.y + max.y) / 2.0;
    let half = ((max.x - min.x).max(max.y - min.y)).max(1.0) * 16.0;
    verts.push(Point2::new(cx - 2.0 * half, cy - half));
    verts.push(Point2::new(cx + 2.0 * half, cy - half));
    verts.push(Point2::new(cx, cy + 2.0 * half));

    let mut triangles: Vec<[usize; 3]> = vec![ccw(&verts, [n, n + 1, n + 2])];

    for site in 0..n {
        let p = verts[site];

        // Triangles whose circumcircle contains the new site.
        let mut bad = vec![false; triangles.len()];
        let mut any_bad = false;
        for (ti, t) in triangles.iter().enumerate() {
            if in_circumcircle(verts[t[0]], verts[t[1]], verts[t[2]], p) {
                bad[ti] = true;
                any_bad = true;
            }
        }
        if !any_bad {
            // Every site lies inside the super-triangle, so at least one
            // circumcircle must contain it; hitting this means the scatter
            // is numerically degenerate beyond what the predicates resolve.
            return None;
        }

        // The cavity boundary: undirected edges belonging to exactly one
        // bad triangle. A BTreeMap keeps the retriangulation order stable.
        let mut edges: BTreeMap<(usize, usize), usize> = BTreeMap::new();
        for (ti, t) in triangles.iter().enumerate() {
            if !bad[ti] {
                continue;
            }
            for (a, b) in [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
                let key = (a.min(b), a.max(b));
                *edges.entry(key).or_insert(0) += 1;
            }
        }

        let mut kept: Vec<[usize; 3]> = Vec::with_capacity(triangles.len());
        for (ti, t) in triangles.iter().enumerate() {
            if !bad[ti] {
                kept.push(*t);
            }
        }
        for (&(a, b), &count) in &edges {
            if count == 1 {
                kept.push(ccw(&verts, [site, a, b]));
            }
        }
        triangles = kept;
    }

    // Strip everything still attached to the super-triangle.
    let triangles: Vec<[usize; 3]> = triangles
        .into_iter()
        .filter(|t| t.iter().all(|&v| v < n))
        .collect();

    if triangles.is_empty() {
        return None;
    }

    Some(Triangulation {
        points: verts[..n].to_vec(),
        triangles,
    })
}

fn bounds(points: &[Point2<f64>]) -> (Point2<f64>, Point2<f64>) {
    let mut min = Point2::new(f64::INFINITY, f64::INFINITY);
    let mut max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    (min, max)
}

fn ccw(verts: &[Point2<f64>], t: [usize; 3]) -> [usize; 3] {
    if orient2d(verts[t[0]], verts[t[1]], verts[t[2]]) < 0.0 {
        [t[0], t[2], t[1]]
    } else {
        t
    }
}

/// Tolerance on barycentric weights when testing triangle membership.
/// Slightly negative weights at shared edges/hull boundary still count.
const INSIDE_EPS: f64 = 1e-9;

/// Point-location over a triangulation via a uniform bucket grid keyed by
/// triangle bounding boxes. Queries test only the triangles overlapping
/// their bucket, which keeps dense-fill cost near linear for regular maps.
#[derive(Debug)]
pub struct TriangleLocator {
    tri: Triangulation,
    min: Point2<f64>,
    cell: Vector2<f64>,
    n: usize,
    buckets: Vec<Vec<usize>>,
}

impl TriangleLocator {
    pub fn new(tri: Triangulation) -> Self {
        let (min, max) = bounds(&tri.points);
        let n = ((tri.triangles.len() as f64).sqrt().ceil() as usize).clamp(1, 64);
        let width = (max.x - min.x).max(f64::MIN_POSITIVE);
        let height = (max.y - min.y).max(f64::MIN_POSITIVE);
        let cell = Vector2::new(width / n as f64, height / n as f64);

        let mut buckets = vec![Vec::new(); n * n];
        for (ti, t) in tri.triangles.iter().enumerate() {
            let (tmin, tmax) = bounds(&[
                tri.points[t[0]],
                tri.points[t[1]],
                tri.points[t[2]],
            ]);
            let (ix0, iy0) = bucket_of(tmin, min, cell, n);
            let (ix1, iy1) = bucket_of(tmax, min, cell, n);
            for iy in iy0..=iy1 {
                for ix in ix0..=ix1 {
                    buckets[iy * n + ix].push(ti);
                }
            }
        }

        Self {
            tri,
            min,
            cell,
            n,
            buckets,
        }
    }

    /// Find the triangle containing `p` and the clamped barycentric weights
    /// of `p` within it. `None` means `p` is outside the convex hull.
    pub fn locate(&self, p: Point2<f64>) -> Option<([usize; 3], [f64; 3])> {
        let (ix, iy) = bucket_of(p, self.min, self.cell, self.n);
        for &ti in &self.buckets[iy * self.n + ix] {
            let t = self.tri.triangles[ti];
            let w = barycentric(
                self.tri.points[t[0]],
                self.tri.points[t[1]],
                self.tri.points[t[2]],
                p,
            );
            if let Some(w) = w {
                if w.iter().all(|&wi| wi >= -INSIDE_EPS) {
                    // Clamp boundary noise so weights stay a convex combination.
                    let clamped = [w[0].max(0.0), w[1].max(0.0), w[2].max(0.0)];
                    let sum: f64 = clamped.iter().sum();
                    return Some((t, [clamped[0] / sum, clamped[1] / sum, clamped[2] / sum]));
                }
            }
        }
        None
    }
}

fn bucket_of(p: Point2<f64>, min: Point2<f64>, cell: Vector2<f64>, n: usize) -> (usize, usize) {
    let ix = ((p.x - min.x) / cell.x).floor();
    let iy = ((p.y - min.y) / cell.y).floor();
    (
        (ix.max(0.0) as usize).min(n - 1),
        (iy.max(0.0) as usize).min(n - 1),
    )
}
