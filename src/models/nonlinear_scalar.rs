//! Univariate nonlinear growth model
//!
//! `x' = 0.5 x + 25 x / (1 + x²) + w`, `w ~ N(0, q)`: the classic
//! benchmark for nonlinear filters.

use nalgebra::{DMatrix, DVector};

use crate::common::linalg::gaussian_pdf;
use crate::common::rng::{gaussian_noise, SimpleRng};
use crate::filter::errors::ModelError;
use crate::models::state::{AdditiveStateModel, HasTransitionProbability, StateModel};
use crate::types::VectorDescription;

/// Scalar nonlinear state model with additive Gaussian noise
#[derive(Debug, Clone)]
pub struct NonLinearScalarModel {
    q: DMatrix<f64>,
    sqrt_q: DMatrix<f64>,
    rng: SimpleRng,
}

impl NonLinearScalarModel {
    /// # Arguments
    /// * `process_variance` - Variance `q` of the additive noise, must be positive
    /// * `seed` - Seed of the model's noise source
    pub fn new(process_variance: f64, seed: u64) -> Result<Self, ModelError> {
        if !(process_variance > 0.0 && process_variance.is_finite()) {
            return Err(ModelError::Configuration {
                description: format!("process variance must be positive, got {}", process_variance),
            });
        }
        Ok(Self {
            q: DMatrix::from_element(1, 1, process_variance),
            sqrt_q: DMatrix::from_element(1, 1, process_variance.sqrt()),
            rng: SimpleRng::new(seed),
        })
    }

    /// Noise variance from a sampling period and a noise intensity: `q = T³ q̃ / 3`
    pub fn from_sampling_period(period: f64, intensity: f64, seed: u64) -> Result<Self, ModelError> {
        Self::new(period.powi(3) * intensity / 3.0, seed)
    }
}

impl StateModel for NonLinearScalarModel {
    fn propagate(&self, cur_states: &DMatrix<f64>) -> DMatrix<f64> {
        cur_states.map(|x| 0.5 * x + 25.0 * x / (1.0 + x * x))
    }

    fn motion(&mut self, cur_states: &DMatrix<f64>) -> Result<DMatrix<f64>, ModelError> {
        self.additive_motion(cur_states)
    }

    fn noise_covariance_matrix(&self) -> Result<DMatrix<f64>, ModelError> {
        Ok(self.q.clone())
    }

    fn noise_sample(&mut self, num: usize) -> Result<DMatrix<f64>, ModelError> {
        Ok(gaussian_noise(&mut self.rng, &self.sqrt_q, num))
    }

    fn state_description(&self) -> VectorDescription {
        VectorDescription::linear(1)
    }

    fn input_description(&self) -> VectorDescription {
        self.additive_input_description()
    }
}

impl AdditiveStateModel for NonLinearScalarModel {}

impl HasTransitionProbability for NonLinearScalarModel {
    /// Density of `cur - prev` under `N(0, q)`
    fn transition_probability(&self, prev_states: &DMatrix<f64>, cur_states: &DMatrix<f64>) -> DVector<f64> {
        let zero = DVector::zeros(1);
        DVector::from_iterator(
            prev_states.ncols(),
            prev_states
                .column_iter()
                .zip(cur_states.column_iter())
                .map(|(p, c)| gaussian_pdf(&(c - p), &zero, &self.q)),
        )
    }
}
