//! Grid construction: axis derivation and dense interpolation.
//!
//! `axes` turns the observation key set into sorted, strictly increasing
//! RPM/Load axes (with degeneracy classification); `engine` fills the
//! axis cross product into a complete rectangular timing grid.

pub mod axes;
pub mod engine;

pub use axes::{Axes, derive_axes};
pub use engine::build_surface;
