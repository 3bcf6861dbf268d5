//! Systematic resampling
//!
//! One uniform draw `u₀ ~ U[0, 1/N)` places `N` equally spaced pointers on
//! the cumulative weight distribution; each pointer selects the particle
//! whose cumulative weight interval contains it. The resampled set has
//! uniform log-weights `-ln N`.

use crate::common::rng::SimpleRng;
use crate::filter::traits::Resampling;
use crate::types::ParticleSet;

/// Systematic resampling with an owned, seeded random source
#[derive(Debug, Clone)]
pub struct SystematicResampling {
    rng: SimpleRng,
}

impl SystematicResampling {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SimpleRng::new(seed),
        }
    }

    /// Indices of the particles selected by one systematic pass
    pub fn select(&mut self, weights: &[f64]) -> Vec<usize> {
        let n = weights.len();
        if n == 0 {
            return Vec::new();
        }

        let step = 1.0 / n as f64;
        let start = self.rng.rand() * step;

        let mut parents = Vec::with_capacity(n);
        let mut cumulative = weights[0];
        let mut i = 0;
        for j in 0..n {
            let pointer = start + j as f64 * step;
            while pointer > cumulative && i + 1 < n {
                i += 1;
                cumulative += weights[i];
            }
            parents.push(i);
        }
        parents
    }
}

impl Default for SystematicResampling {
    fn default() -> Self {
        Self {
            rng: SimpleRng::default(),
        }
    }
}

impl Resampling for SystematicResampling {
    fn resample(&mut self, particles: &ParticleSet) -> ParticleSet {
        let weights = particles.weights();
        let parents = self.select(weights.as_slice());

        let state = particles.state();
        let mut resampled = particles.clone();
        {
            let mut columns = resampled.state_mut();
            for (j, &parent) in parents.iter().enumerate() {
                columns.set_column(j, &state.column(parent));
            }
        }
        resampled.set_uniform_log_weights();
        resampled
    }
}
