//! Configuration types for filters
//!
//! Plain serde-serialisable structs with sensible defaults, so callers can
//! load them from JSON or build them in code.

use serde::{Deserialize, Serialize};

/// Scaling constants of the unscented transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnscentedParams {
    /// Spread of the sigma points around the mean
    pub alpha: f64,
    /// Prior knowledge of the distribution (2 is optimal for Gaussians)
    pub beta: f64,
    /// Secondary scaling parameter
    pub kappa: f64,
}

impl UnscentedParams {
    pub fn new(alpha: f64, beta: f64, kappa: f64) -> Self {
        Self { alpha, beta, kappa }
    }
}

impl Default for UnscentedParams {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            beta: 2.0,
            kappa: 0.0,
        }
    }
}

/// Configuration of an unscented correction step
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UkfCorrectionConfig {
    pub params: UnscentedParams,
    /// Recompute sigma-point weights from the model's input description on
    /// every generic correction
    pub update_weights_online: bool,
}

/// Configuration of a Gaussian filter run
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GaussianFilterConfig {
    /// Number of filtering steps per run (`None` runs until teardown)
    pub max_steps: Option<usize>,
}

/// Configuration of a sequential importance sampling filter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SisConfig {
    /// Number of particles (fixed for the run)
    pub num_particles: usize,
    /// Resample when `neff < resampling_threshold * num_particles`
    pub resampling_threshold: f64,
    /// Number of filtering steps per run (`None` runs until teardown)
    pub max_steps: Option<usize>,
}

impl Default for SisConfig {
    fn default() -> Self {
        Self {
            num_particles: 100,
            resampling_threshold: 1.0 / 3.0,
            max_steps: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = UnscentedParams::default();
        assert_eq!((p.alpha, p.beta, p.kappa), (1.0, 2.0, 0.0));
        assert!(!UkfCorrectionConfig::default().update_weights_online);
        assert!((SisConfig::default().resampling_threshold - 1.0 / 3.0).abs() < 1e-15);
    }

    #[test]
    fn test_load_from_json() {
        let json = r#"{ "num_particles": 50, "resampling_threshold": 0.5, "max_steps": 100 }"#;
        let config: SisConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.num_particles, 50);
        assert_eq!(config.max_steps, Some(100));

        let json = r#"{ "params": { "alpha": 0.5, "beta": 2.0, "kappa": 1.0 }, "update_weights_online": true }"#;
        let config: UkfCorrectionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.params.alpha, 0.5);
        assert!(config.update_weights_online);
    }
}
