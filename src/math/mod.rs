//! Numerical geometry primitives for scattered-data interpolation.

pub mod delaunay;
pub mod geometry;

pub use delaunay::{Triangulation, TriangleLocator, triangulate};
pub use geometry::{Line2, barycentric, collinear_line, in_circumcircle, orient2d};
