//! Core traits for filters and their steps
//!
//! Gaussian filters compose a [`GaussianPrediction`] with a
//! [`GaussianCorrection`]; particle filters compose a [`PfPrediction`], a
//! [`PfCorrection`], a [`Resampling`] scheme and a
//! [`ParticleSetInitialization`]. Anything that implements
//! [`FilteringAlgorithm`] can be driven by the
//! [`FilterHandle`](crate::filter::FilterHandle) lifecycle.

use nalgebra::DVector;

use crate::models::{MeasurementModel, StateModel};
use crate::types::{Data, GaussianMixture, ParticleSet};

/// Which parts of a prediction are disabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SkipFlags {
    pub state: bool,
    pub exogenous: bool,
}

impl SkipFlags {
    /// Set a flag by name: `"prediction"` (both), `"state"` or `"exogenous"`
    ///
    /// Returns `false` for an unknown name.
    pub fn set(&mut self, what: &str, status: bool) -> bool {
        match what {
            "prediction" => {
                self.state = status;
                self.exogenous = status;
            }
            "state" => self.state = status,
            "exogenous" => self.exogenous = status,
            _ => return false,
        }
        true
    }

    #[inline]
    pub fn all(&self) -> bool {
        self.state && self.exogenous
    }
}

/// Prediction step over Gaussian mixtures
pub trait GaussianPrediction: Send {
    /// Predicted belief; never fails
    fn predict(&mut self, prev: &GaussianMixture) -> GaussianMixture;

    fn skip_flags(&self) -> SkipFlags;

    fn skip_flags_mut(&mut self) -> &mut SkipFlags;

    /// Disable or re-enable part of the prediction by name
    fn skip(&mut self, what: &str, status: bool) -> bool {
        self.skip_flags_mut().set(what, status)
    }

    fn state_model(&self) -> &dyn StateModel;
}

/// Correction step over Gaussian mixtures
pub trait GaussianCorrection: Send {
    /// Corrected belief, ignoring the skip flag
    fn correct_step(&mut self, pred: &GaussianMixture) -> GaussianMixture;

    fn measurement_model(&self) -> &dyn MeasurementModel;

    fn measurement_model_mut(&mut self) -> &mut dyn MeasurementModel;

    fn is_skipping(&self) -> bool;

    fn skip(&mut self, status: bool);

    /// Corrected belief; a skipped correction returns `pred` unchanged
    fn correct(&mut self, pred: &GaussianMixture) -> GaussianMixture {
        if self.is_skipping() {
            pred.clone()
        } else {
            self.correct_step(pred)
        }
    }

    /// Latch the next measurement in the measurement model
    fn freeze_measurements(&mut self, data: &Data) -> bool {
        self.measurement_model_mut().freeze(data)
    }

    /// Per-component likelihood of the last correction, if one took place
    fn likelihood(&self) -> Option<DVector<f64>> {
        None
    }
}

/// Prediction step over particle sets
pub trait PfPrediction: Send {
    /// Predicted particles; never fails
    fn predict(&mut self, prev: &ParticleSet) -> ParticleSet;

    fn skip_flags(&self) -> SkipFlags;

    fn skip_flags_mut(&mut self) -> &mut SkipFlags;

    fn skip(&mut self, what: &str, status: bool) -> bool {
        self.skip_flags_mut().set(what, status)
    }

    fn state_model(&self) -> &dyn StateModel;
}

/// Correction step over particle sets
pub trait PfCorrection: Send {
    /// Corrected particles, ignoring the skip flag
    fn correct_step(&mut self, pred: &ParticleSet) -> ParticleSet;

    fn measurement_model(&self) -> &dyn MeasurementModel;

    fn measurement_model_mut(&mut self) -> &mut dyn MeasurementModel;

    fn is_skipping(&self) -> bool;

    fn skip(&mut self, status: bool);

    fn correct(&mut self, pred: &ParticleSet) -> ParticleSet {
        if self.is_skipping() {
            pred.clone()
        } else {
            self.correct_step(pred)
        }
    }

    fn freeze_measurements(&mut self, data: &Data) -> bool {
        self.measurement_model_mut().freeze(data)
    }

    /// Per-particle likelihood of the last correction, if one took place
    fn likelihood(&self) -> Option<DVector<f64>> {
        None
    }
}

/// Resampling scheme consumed as a black box
pub trait Resampling: Send {
    /// Resampled set of the same size, with uniform log-weights
    fn resample(&mut self, particles: &ParticleSet) -> ParticleSet;

    /// Effective sample size used as the resampling trigger
    fn neff(&self, particles: &ParticleSet) -> f64 {
        particles.neff()
    }
}

/// Fills a particle set at the start of every run
pub trait ParticleSetInitialization: Send {
    fn initialize(&mut self, particles: &mut ParticleSet) -> bool;
}

/// Concrete filter driven by the lifecycle loop
pub trait FilteringAlgorithm: Send + 'static {
    /// Called at the start of every (re)run
    fn initialization(&mut self) -> bool;

    /// Whether another step should run; `step` counts steps of this run.
    /// Must be cheap and free of side effects.
    fn run_condition(&self, step: usize) -> bool;

    /// Predict, correct and optionally resample
    fn filtering_step(&mut self);
}
