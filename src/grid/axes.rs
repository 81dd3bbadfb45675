//! Axis derivation from the observation key set.

use crate::domain::{AxisKind, Limits, ObservationSet};
use crate::error::MapError;

/// The regular grid axes: sorted, strictly increasing, distinct values.
#[derive(Debug, Clone, PartialEq)]
pub struct Axes {
    pub rpm: Vec<f64>,
    pub load: Vec<f64>,
}

/// Derive both axes and classify degeneracy.
///
/// - both axes `< 2` distinct values → `DegenerateGeometry` (a single
///   repeated site; no surface can exist)
/// - exactly one axis `< 2` → `InsufficientAxis` for that axis
/// - an axis above the configured ceiling → `InputTooLarge`
pub fn derive_axes(set: &ObservationSet, limits: &Limits) -> Result<Axes, MapError> {
    // Keys iterate rpm-major, so rpm values arrive sorted; load values need
    // their own sort. Dedup uses exact equality, which is the same notion
    // of "distinct" the key set itself uses.
    let mut rpm: Vec<f64> = Vec::new();
    let mut load: Vec<f64> = Vec::new();
    for (key, _) in set.iter() {
        if rpm.last() != Some(&key.rpm()) {
            rpm.push(key.rpm());
        }
        load.push(key.load());
    }
    load.sort_by(f64::total_cmp);
    load.dedup();

    if rpm.len() < 2 && load.len() < 2 {
        return Err(MapError::DegenerateGeometry {
            reason: "all observations share a single (RPM, Load) site".to_string(),
        });
    }
    if rpm.len() < 2 {
        return Err(MapError::InsufficientAxis {
            axis: AxisKind::Rpm,
            distinct: rpm.len(),
        });
    }
    if load.len() < 2 {
        return Err(MapError::InsufficientAxis {
            axis: AxisKind::Load,
            distinct: load.len(),
        });
    }

    if rpm.len() > limits.max_axis {
        return Err(MapError::InputTooLarge {
            what: "distinct RPM values",
            limit: limits.max_axis,
            actual: rpm.len(),
        });
    }
    if load.len() > limits.max_axis {
        return Err(MapError::InputTooLarge {
            what: "distinct Load values",
            limit: limits.max_axis,
            actual: load.len(),
        });
    }

    Ok(Axes { rpm, load })
}
