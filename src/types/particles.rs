//! Weighted particle sets
//!
//! A [`ParticleSet`] stores one state per column and one **log**-domain,
//! possibly unnormalised, importance weight per particle. The number of
//! particles is fixed at construction; setters reject any shape change.

use nalgebra::{DMatrix, DMatrixViewMut, DVector};

use crate::common::directional::directional_mean;
use crate::common::linalg::log_sum_exp;
use crate::filter::errors::FilterError;
use crate::types::description::VectorDescription;

/// Particles and their log-weights
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSet {
    state: DMatrix<f64>,
    log_weights: DVector<f64>,
    description: VectorDescription,
}

impl ParticleSet {
    /// Create `num_particles` zero particles with uniform log-weights
    pub fn new(num_particles: usize, description: VectorDescription) -> Result<Self, FilterError> {
        if num_particles == 0 {
            return Err(FilterError::configuration("a particle set needs at least one particle"));
        }
        let dim = description.noiseless().total_size();
        let mut set = Self {
            state: DMatrix::zeros(dim, num_particles),
            log_weights: DVector::zeros(num_particles),
            description: description.noiseless(),
        };
        set.set_uniform_log_weights();
        Ok(set)
    }

    #[inline]
    pub fn num_particles(&self) -> usize {
        self.log_weights.len()
    }

    /// Stored size of each particle
    #[inline]
    pub fn dim(&self) -> usize {
        self.state.nrows()
    }

    #[inline]
    pub fn description(&self) -> &VectorDescription {
        &self.description
    }

    #[inline]
    pub fn state(&self) -> &DMatrix<f64> {
        &self.state
    }

    /// Mutable view on the particle states (shape cannot change)
    pub fn state_mut(&mut self) -> DMatrixViewMut<'_, f64> {
        let shape = self.state.shape();
        self.state.view_mut((0, 0), shape)
    }

    #[inline]
    pub fn log_weights(&self) -> &DVector<f64> {
        &self.log_weights
    }

    /// Replace all particle states
    pub fn set_state(&mut self, state: DMatrix<f64>) -> Result<(), FilterError> {
        if state.shape() != self.state.shape() {
            let context = format!(
                "particle states ({}x{} vs {}x{})",
                state.nrows(),
                state.ncols(),
                self.state.nrows(),
                self.state.ncols()
            );
            return Err(FilterError::dimension(
                self.state.nrows() * self.state.ncols(),
                state.nrows() * state.ncols(),
                context,
            ));
        }
        self.state = state;
        Ok(())
    }

    /// Replace all log-weights
    pub fn set_log_weights(&mut self, log_weights: DVector<f64>) -> Result<(), FilterError> {
        if log_weights.len() != self.num_particles() {
            return Err(FilterError::dimension(
                self.num_particles(),
                log_weights.len(),
                "particle log-weights",
            ));
        }
        self.log_weights = log_weights;
        Ok(())
    }

    /// Set every log-weight to `-ln N`
    pub fn set_uniform_log_weights(&mut self) {
        let w = -(self.num_particles() as f64).ln();
        self.log_weights.fill(w);
    }

    /// Normalise log-weights so that `Σ exp(wᵢ) = 1`
    ///
    /// # Returns
    /// The log of the pre-normalisation weight sum. If every weight is
    /// `-inf` the set is reset to uniform weights.
    pub fn normalise(&mut self) -> f64 {
        let log_sum = log_sum_exp(self.log_weights.as_slice());
        if log_sum.is_finite() {
            self.log_weights.add_scalar_mut(-log_sum);
        } else {
            self.set_uniform_log_weights();
        }
        log_sum
    }

    /// Normalised linear-domain weights
    pub fn weights(&self) -> DVector<f64> {
        let log_sum = log_sum_exp(self.log_weights.as_slice());
        if !log_sum.is_finite() {
            return DVector::from_element(self.num_particles(), 1.0 / self.num_particles() as f64);
        }
        self.log_weights.map(|w| (w - log_sum).exp())
    }

    /// Effective sample size `1 / Σ wᵢ²` of the normalised weights
    pub fn neff(&self) -> f64 {
        let w = self.weights();
        1.0 / w.dot(&w)
    }

    /// Weighted mean state
    ///
    /// Circular components (Euler only) use the circular mean.
    pub fn weighted_mean(&self) -> DVector<f64> {
        let w = self.weights();
        let mut mean = &self.state * &w;

        let circular = self.description.circular_size();
        if circular > 0 && !self.description.is_quaternion() {
            let start = self.description.linear_size();
            let angles = self.state.rows(start, circular).into_owned();
            mean.rows_mut(start, circular)
                .copy_from(&directional_mean(&angles, &w));
        }
        mean
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_new_rejects_empty_set() {
        assert!(ParticleSet::new(0, VectorDescription::linear(1)).is_err());
    }

    #[test]
    fn test_shape_invariant_enforced() {
        let mut set = ParticleSet::new(5, VectorDescription::linear(2)).unwrap();
        assert_eq!(set.state().shape(), (2, 5));
        assert_eq!(set.log_weights().len(), 5);

        assert!(set.set_state(DMatrix::zeros(2, 4)).is_err());
        assert!(set.set_log_weights(DVector::zeros(6)).is_err());
        assert!(set.set_state(DMatrix::from_element(2, 5, 1.0)).is_ok());
        assert_eq!(set.num_particles(), 5);
    }

    #[test]
    fn test_uniform_weights_and_neff() {
        let set = ParticleSet::new(4, VectorDescription::linear(1)).unwrap();
        assert_abs_diff_eq!(set.log_weights()[0], -(4.0_f64).ln(), epsilon = 1e-12);
        assert_abs_diff_eq!(set.neff(), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_normalise() {
        let mut set = ParticleSet::new(2, VectorDescription::linear(1)).unwrap();
        set.set_log_weights(DVector::from_vec(vec![0.0, 0.0])).unwrap();
        let log_sum = set.normalise();
        assert_abs_diff_eq!(log_sum, 2.0_f64.ln(), epsilon = 1e-12);
        assert_abs_diff_eq!(set.log_weights()[1], -(2.0_f64).ln(), epsilon = 1e-12);

        set.set_log_weights(DVector::from_element(2, f64::NEG_INFINITY)).unwrap();
        set.normalise();
        assert!(set.log_weights().iter().all(|w| w.is_finite()));
    }

    #[test]
    fn test_weighted_mean() {
        let mut set = ParticleSet::new(2, VectorDescription::linear(1)).unwrap();
        set.set_state(DMatrix::from_row_slice(1, 2, &[1.0, 3.0])).unwrap();
        set.set_log_weights(DVector::from_vec(vec![0.0, 1.0_f64.ln() + 3.0_f64.ln()]))
            .unwrap();
        // weights 1/4, 3/4
        assert_abs_diff_eq!(set.weighted_mean()[0], 2.5, epsilon = 1e-12);
    }
}
