//! Planar predicates and barycentric coordinates.
//!
//! All of these operate on points the caller has already scaled into the
//! unit square. Working in scaled coordinates keeps the determinant-based
//! predicates well conditioned when the raw axes differ by orders of
//! magnitude (RPM in the thousands, Load in the tens); barycentric
//! coordinates are affine-invariant, so interpolation weights computed
//! here are valid for the raw points too.

use nalgebra::{Matrix2, Matrix3, Point2, Vector2};

/// Twice the signed area of triangle (a, b, c); positive when CCW.
pub fn orient2d(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>) -> f64 {
    let ab = b - a;
    let ac = c - a;
    ab.x * ac.y - ab.y * ac.x
}

/// Barycentric coordinates of `p` with respect to triangle (a, b, c).
///
/// Returns `None` when the triangle is (numerically) degenerate. The
/// weights sum to 1; `p` is inside the triangle iff all three are
/// non-negative (up to the caller's tolerance).
pub fn barycentric(
    a: Point2<f64>,
    b: Point2<f64>,
    c: Point2<f64>,
    p: Point2<f64>,
) -> Option<[f64; 3]> {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let m = Matrix2::new(ab.x, ac.x, ab.y, ac.y);
    let w = m.lu().solve(&Vector2::new(ap.x, ap.y))?;
    let (w1, w2) = (w.x, w.y);
    if !(w1.is_finite() && w2.is_finite()) {
        return None;
    }
    Some([1.0 - w1 - w2, w1, w2])
}

/// Whether `p` lies strictly inside the circumcircle of CCW triangle (a, b, c).
///
/// Cocircular points (exactly on the circle) count as outside, which keeps
/// Bowyer–Watson stable on regular grids where many sites are cocircular.
pub fn in_circumcircle(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>, p: Point2<f64>) -> bool {
    let (ax, ay) = (a.x - p.x, a.y - p.y);
    let (bx, by) = (b.x - p.x, b.y - p.y);
    let (cx, cy) = (c.x - p.x, c.y - p.y);

    let det = Matrix3::new(
        ax,
        ay,
        ax * ax + ay * ay,
        bx,
        by,
        bx * bx + by * by,
        cx,
        cy,
        cx * cx + cy * cy,
    )
    .determinant();

    det > 1e-12
}

/// A line through a scatter that turned out to be collinear.
#[derive(Debug, Clone, Copy)]
pub struct Line2 {
    pub origin: Point2<f64>,
    /// Unit direction.
    pub dir: Vector2<f64>,
    /// Distance from `origin` to the farthest point along `dir`.
    pub span: f64,
}

impl Line2 {
    /// Signed distance of `p`'s projection along the line from `origin`.
    pub fn param(&self, p: Point2<f64>) -> f64 {
        (p - self.origin).dot(&self.dir)
    }

    /// Perpendicular distance of `p` from the line.
    pub fn distance(&self, p: Point2<f64>) -> f64 {
        let v = p - self.origin;
        (v.x * self.dir.y - v.y * self.dir.x).abs()
    }
}

/// Relative tolerance for classifying a scatter as collinear.
const COLLINEAR_REL_EPS: f64 = 1e-9;

/// Detect whether every point lies on one line.
///
/// Returns the fitted line when the scatter is collinear (within a relative
/// tolerance of its own span), `None` when the points genuinely span 2D.
/// Callers guarantee at least two distinct points.
pub fn collinear_line(points: &[Point2<f64>]) -> Option<Line2> {
    let origin = points[0];

    // Anchor the direction on the point farthest from the first one; using
    // two near-coincident points would make the direction meaningless.
    let (far_idx, span_sq) = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i, (p - origin).norm_squared()))
        .fold((0, 0.0_f64), |acc, cur| if cur.1 > acc.1 { cur } else { acc });

    let span = span_sq.sqrt();
    if span <= 0.0 {
        // All points coincide; callers rule this out via axis checks.
        return None;
    }

    let dir = (points[far_idx] - origin) / span;
    let line = Line2 { origin, dir, span };

    let tol = span * COLLINEAR_REL_EPS;
    let max_dist = points
        .iter()
        .map(|&p| line.distance(p))
        .fold(0.0_f64, f64::max);

    if max_dist <= tol { Some(line) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64) -> Point2<f64> {
        Point2::new(x, y)
    }

    #[test]
    fn orientation_sign() {
        assert!(orient2d(pt(0.0, 0.0), pt(1.0, 0.0), pt(0.0, 1.0)) > 0.0);
        assert!(orient2d(pt(0.0, 0.0), pt(0.0, 1.0), pt(1.0, 0.0)) < 0.0);
    }

    #[test]
    fn barycentric_weights_sum_to_one() {
        let (a, b, c) = (pt(0.0, 0.0), pt(1.0, 0.0), pt(0.0, 1.0));
        let w = barycentric(a, b, c, pt(0.25, 0.25)).unwrap();
        assert!((w[0] + w[1] + w[2] - 1.0).abs() < 1e-12);
        assert!(w.iter().all(|&wi| wi >= 0.0));
    }

    #[test]
    fn barycentric_recovers_vertices() {
        let (a, b, c) = (pt(0.0, 0.0), pt(1.0, 0.0), pt(0.0, 1.0));
        let w = barycentric(a, b, c, b).unwrap();
        assert!((w[0]).abs() < 1e-12);
        assert!((w[1] - 1.0).abs() < 1e-12);
        assert!((w[2]).abs() < 1e-12);
    }

    #[test]
    fn barycentric_outside_goes_negative() {
        let (a, b, c) = (pt(0.0, 0.0), pt(1.0, 0.0), pt(0.0, 1.0));
        let w = barycentric(a, b, c, pt(1.0, 1.0)).unwrap();
        assert!(w.iter().any(|&wi| wi < 0.0));
    }

    #[test]
    fn degenerate_triangle_yields_none() {
        assert!(barycentric(pt(0.0, 0.0), pt(1.0, 1.0), pt(2.0, 2.0), pt(0.5, 0.5)).is_none());
    }

    #[test]
    fn circumcircle_of_right_triangle() {
        // Circumcircle of (0,0),(1,0),(0,1) has center (0.5,0.5), r^2 = 0.5.
        let (a, b, c) = (pt(0.0, 0.0), pt(1.0, 0.0), pt(0.0, 1.0));
        assert!(in_circumcircle(a, b, c, pt(0.5, 0.5)));
        assert!(!in_circumcircle(a, b, c, pt(2.0, 2.0)));
        // The fourth corner of the unit square is exactly cocircular: outside.
        assert!(!in_circumcircle(a, b, c, pt(1.0, 1.0)));
    }

    #[test]
    fn collinear_line_detects_diagonal() {
        let points = vec![pt(0.0, 0.0), pt(0.5, 0.5), pt(1.0, 1.0)];
        let line = collinear_line(&points).unwrap();
        assert!((line.span - 2.0_f64.sqrt()).abs() < 1e-12);
        assert!(line.distance(pt(0.25, 0.25)) < 1e-12);
    }

    #[test]
    fn collinear_line_rejects_2d_scatter() {
        let points = vec![pt(0.0, 0.0), pt(1.0, 0.0), pt(0.0, 1.0)];
        assert!(collinear_line(&points).is_none());
    }
}
