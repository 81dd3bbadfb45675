//! Deterministic mock-map generation.
//!
//! The baseline surface is the classic smoke-test map:
//!
//! `Timing = RPM / 1000 + Load / 10 + offset`
//!
//! (`offset = 1.0` mimics a "tuned" map against an `offset = 0.0` stock
//! map). Optional Gaussian noise and blank-Timing holes exercise the
//! normalizer's drop counting and the interpolation path; both are driven
//! by a seeded RNG so a given configuration always produces the same CSV.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{SampleConfig, TidyRow};
use crate::error::MapError;

/// Baseline timing surface for generated maps.
pub fn baseline_timing(rpm: f64, load: f64, offset: f64) -> f64 {
    rpm / 1000.0 + load / 10.0 + offset
}

/// Generate tidy rows for the configured axes (load-major, rpm-minor).
pub fn generate_sample(config: &SampleConfig) -> Result<Vec<TidyRow>, MapError> {
    let rpm_axis = axis_values(config.rpm_min, config.rpm_max, config.rpm_step)
        .ok_or_else(|| MapError::config("Invalid RPM range/step for sample generation."))?;
    let load_axis = axis_values(config.load_min, config.load_max, config.load_step)
        .ok_or_else(|| MapError::config("Invalid Load range/step for sample generation."))?;

    if !(config.noise_sigma.is_finite() && config.noise_sigma >= 0.0) {
        return Err(MapError::config("Noise sigma must be finite and >= 0."));
    }
    if !(config.hole_fraction.is_finite() && (0.0..1.0).contains(&config.hole_fraction)) {
        return Err(MapError::config("Hole fraction must be in [0, 1)."));
    }
    if !config.offset.is_finite() {
        return Err(MapError::config("Timing offset must be finite."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = if config.noise_sigma > 0.0 {
        Some(
            Normal::new(0.0, config.noise_sigma)
                .map_err(|e| MapError::config(format!("Noise distribution error: {e}")))?,
        )
    } else {
        None
    };

    let mut rows = Vec::with_capacity(rpm_axis.len() * load_axis.len());
    for &load in &load_axis {
        for &rpm in &rpm_axis {
            let mut timing = baseline_timing(rpm, load, config.offset);
            if let Some(noise) = &noise {
                timing += noise.sample(&mut rng);
            }
            let timing = if config.hole_fraction > 0.0
                && rng.gen_range(0.0..1.0) < config.hole_fraction
            {
                None
            } else {
                Some(timing)
            };
            rows.push(TidyRow { rpm, load, timing });
        }
    }

    Ok(rows)
}

/// Inclusive arithmetic axis; computed by index so step error never
/// accumulates across long axes.
fn axis_values(min: f64, max: f64, step: f64) -> Option<Vec<f64>> {
    if !(min.is_finite() && max.is_finite() && step.is_finite() && step > 0.0 && max >= min) {
        return None;
    }
    let count = ((max - min) / step + 1e-9).floor() as usize + 1;
    Some((0..count).map(|i| min + i as f64 * step).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config() -> SampleConfig {
        SampleConfig {
            out_path: PathBuf::from("unused.csv"),
            rpm_min: 1000.0,
            rpm_max: 6000.0,
            rpm_step: 1000.0,
            load_min: 20.0,
            load_max: 100.0,
            load_step: 20.0,
            offset: 0.0,
            noise_sigma: 0.0,
            hole_fraction: 0.0,
            seed: 42,
        }
    }

    #[test]
    fn default_axes_match_the_classic_mock_map() {
        let rows = generate_sample(&config()).unwrap();
        // 6 RPM values x 5 Load values, load-major.
        assert_eq!(rows.len(), 30);
        assert_eq!(rows[0].rpm, 1000.0);
        assert_eq!(rows[0].load, 20.0);
        assert_eq!(rows[0].timing, Some(3.0));
        assert_eq!(rows[29].rpm, 6000.0);
        assert_eq!(rows[29].load, 100.0);
        assert_eq!(rows[29].timing, Some(16.0));
    }

    #[test]
    fn offset_shifts_every_timing() {
        let stock = generate_sample(&config()).unwrap();
        let tuned = generate_sample(&SampleConfig { offset: 1.0, ..config() }).unwrap();
        for (s, t) in stock.iter().zip(tuned.iter()) {
            assert_eq!(t.timing.unwrap(), s.timing.unwrap() + 1.0);
        }
    }

    #[test]
    fn same_seed_is_deterministic() {
        let cfg = SampleConfig { noise_sigma: 0.5, hole_fraction: 0.2, ..config() };
        let a = generate_sample(&cfg).unwrap();
        let b = generate_sample(&cfg).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn hole_fraction_blanks_some_rows() {
        let cfg = SampleConfig { hole_fraction: 0.5, ..config() };
        let rows = generate_sample(&cfg).unwrap();
        let holes = rows.iter().filter(|r| r.timing.is_none()).count();
        assert!(holes > 0 && holes < rows.len());
    }

    #[test]
    fn bad_ranges_are_config_errors() {
        let cfg = SampleConfig { rpm_step: 0.0, ..config() };
        assert!(matches!(generate_sample(&cfg), Err(MapError::Config { .. })));
        let cfg = SampleConfig { hole_fraction: 1.0, ..config() };
        assert!(matches!(generate_sample(&cfg), Err(MapError::Config { .. })));
    }
}
