//! Bootstrap (importance weighting) correction
//!
//! Particles keep their positions; each log-weight is increased by the log
//! of its likelihood, `w' = w + ln(l + ε)` with `ε = f64::MIN_POSITIVE`
//! guarding `ln(0)`. An invalid likelihood leaves the weights untouched.

use log::debug;
use nalgebra::DVector;

use crate::filter::traits::PfCorrection;
use crate::models::{LikelihoodModel, MeasurementModel};
use crate::types::ParticleSet;

/// Importance-weighting correction
pub struct BootstrapCorrection {
    measurement_model: Box<dyn MeasurementModel>,
    likelihood_model: Box<dyn LikelihoodModel>,
    likelihood: Option<DVector<f64>>,
    skip: bool,
}

impl BootstrapCorrection {
    pub fn new(measurement_model: Box<dyn MeasurementModel>, likelihood_model: Box<dyn LikelihoodModel>) -> Self {
        Self {
            measurement_model,
            likelihood_model,
            likelihood: None,
            skip: false,
        }
    }

    pub fn likelihood_model(&self) -> &dyn LikelihoodModel {
        self.likelihood_model.as_ref()
    }

    pub fn set_likelihood_model(&mut self, likelihood_model: Box<dyn LikelihoodModel>) {
        self.likelihood_model = likelihood_model;
    }
}

impl PfCorrection for BootstrapCorrection {
    fn correct_step(&mut self, pred: &ParticleSet) -> ParticleSet {
        let mut cor = pred.clone();

        self.likelihood = self
            .likelihood_model
            .likelihood(self.measurement_model.as_ref(), pred.state())
            .filter(|l| l.len() == pred.num_particles());

        match &self.likelihood {
            Some(likelihood) => {
                let log_likelihood = likelihood.map(|l| (l + f64::MIN_POSITIVE).ln());
                let weights = pred.log_weights() + log_likelihood;
                if let Err(e) = cor.set_log_weights(weights) {
                    debug!("Bootstrap correction skipped: {}", e);
                }
            }
            None => debug!("Bootstrap correction skipped: likelihood not available"),
        }
        cor
    }

    fn measurement_model(&self) -> &dyn MeasurementModel {
        self.measurement_model.as_ref()
    }

    fn measurement_model_mut(&mut self) -> &mut dyn MeasurementModel {
        self.measurement_model.as_mut()
    }

    fn is_skipping(&self) -> bool {
        self.skip
    }

    fn skip(&mut self, status: bool) {
        self.skip = status;
    }

    fn likelihood(&self) -> Option<DVector<f64>> {
        self.likelihood.clone()
    }
}
