//! Likelihood of particle states given the frozen measurement

use nalgebra::{DMatrix, DVector};

use crate::common::linalg::gaussian_pdf_columns;
use crate::models::measurement::MeasurementModel;

/// Scores every state column against the current measurement
pub trait LikelihoodModel: Send {
    /// `None` when no measurement is available or the model cannot score
    fn likelihood(&self, model: &dyn MeasurementModel, states: &DMatrix<f64>) -> Option<DVector<f64>>;
}

/// Multivariate normal density of each innovation under the measurement noise
#[derive(Debug, Clone, Copy, Default)]
pub struct GaussianLikelihood;

impl GaussianLikelihood {
    pub fn new() -> Self {
        Self
    }
}

impl LikelihoodModel for GaussianLikelihood {
    fn likelihood(&self, model: &dyn MeasurementModel, states: &DMatrix<f64>) -> Option<DVector<f64>> {
        let measured = model.measure()?;
        let predicted = model.predicted_measure(states)?;
        let innovations = model.innovation(&predicted, &measured)?.to_matrix().ok()?;
        let covariance = model.noise_covariance_matrix().ok()?;
        if covariance.nrows() != innovations.nrows() {
            return None;
        }

        let zero = DVector::zeros(innovations.nrows());
        Some(gaussian_pdf_columns(&innovations, &zero, &covariance))
    }
}
