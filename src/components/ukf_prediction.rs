//! Unscented Kalman prediction
//!
//! Two flavours:
//! - **Generic**: the process noise covariance is appended to the state
//!   (noise augmentation) and the sigma points carry the noise through
//!   [`StateModel::motion`].
//! - **Additive**: sigma points pass through [`StateModel::propagate`] and
//!   the noise covariance is added to the result.
//!
//! An optional [`ExogenousModel`] is applied after the state transition.
//! With both the transition and the exogenous input skipped the prediction
//! is the identity.

use log::{debug, warn};
use nalgebra::DMatrix;

use crate::components::sigma_point::{unscented_transform, UtWeight};
use crate::filter::config::UnscentedParams;
use crate::filter::errors::FilterError;
use crate::filter::traits::{GaussianPrediction, SkipFlags};
use crate::models::{AdditiveStateModel, ExogenousModel, StateModel};
use crate::types::GaussianMixture;

enum PredictionModel {
    Generic(Box<dyn StateModel>),
    Additive(Box<dyn AdditiveStateModel>),
}

/// UKF prediction step
pub struct UkfPrediction {
    model: PredictionModel,
    exogenous: Option<Box<dyn ExogenousModel>>,
    params: UnscentedParams,
    weight: UtWeight,
    flags: SkipFlags,
}

impl UkfPrediction {
    /// Generic prediction with noise augmentation
    ///
    /// Fails if the model does not expose its noise covariance.
    pub fn generic(model: Box<dyn StateModel>, params: UnscentedParams) -> Result<Self, FilterError> {
        let q = model.noise_covariance_matrix()?;
        let n = model.state_description().dof_size() + q.nrows();
        Ok(Self {
            model: PredictionModel::Generic(model),
            exogenous: None,
            params,
            weight: UtWeight::new(n, params),
            flags: SkipFlags::default(),
        })
    }

    /// Prediction for models with additive process noise
    pub fn additive(model: Box<dyn AdditiveStateModel>, params: UnscentedParams) -> Self {
        let weight = UtWeight::from_description(&model.state_description().noiseless(), params);
        Self {
            model: PredictionModel::Additive(model),
            exogenous: None,
            params,
            weight,
            flags: SkipFlags::default(),
        }
    }

    pub fn set_exogenous_model(&mut self, model: Box<dyn ExogenousModel>) {
        self.exogenous = Some(model);
    }

    pub fn exogenous_model_mut(&mut self) -> Option<&mut (dyn ExogenousModel + 'static)> {
        self.exogenous.as_deref_mut()
    }

    #[inline]
    pub fn params(&self) -> UnscentedParams {
        self.params
    }

    fn try_predict(&mut self, prev: &GaussianMixture) -> Result<GaussianMixture, FilterError> {
        let skip_exogenous = self.flags.exogenous || self.exogenous.is_none();
        let exogenous = if skip_exogenous { None } else { self.exogenous.as_deref() };

        if self.flags.state {
            // Only the exogenous input is applied
            let Some(exog) = exogenous else {
                return Ok(prev.clone());
            };
            let weight = UtWeight::new(prev.dim_covariance(), self.params);
            let output = prev.description();
            let out = unscented_transform(prev, &weight, &output, None, |x| Ok(exog.propagate(x)))?;
            return Ok(out.mixture);
        }

        let out = match &mut self.model {
            PredictionModel::Generic(model) => {
                let q = model.noise_covariance_matrix()?;
                let output = model.state_description();
                let mut augmented = prev.clone();
                augmented.augment_with_noise(&q);
                unscented_transform(&augmented, &self.weight, &output, None, |x| {
                    let moved = model.motion(x)?;
                    Ok(apply_exogenous(exogenous, moved))
                })?
            }
            PredictionModel::Additive(model) => {
                let q = model.noise_covariance_matrix()?;
                let output = model.state_description();
                let model: &dyn AdditiveStateModel = model.as_ref();
                unscented_transform(prev, &self.weight, &output, Some(&q), |x| {
                    Ok(apply_exogenous(exogenous, model.propagate(x)))
                })?
            }
        };
        Ok(out.mixture)
    }
}

fn apply_exogenous(exogenous: Option<&dyn ExogenousModel>, states: DMatrix<f64>) -> DMatrix<f64> {
    match exogenous {
        Some(exog) => exog.propagate(&states),
        None => states,
    }
}

impl GaussianPrediction for UkfPrediction {
    fn predict(&mut self, prev: &GaussianMixture) -> GaussianMixture {
        if self.flags.state && (self.flags.exogenous || self.exogenous.is_none()) {
            return prev.clone();
        }

        match self.try_predict(prev) {
            Ok(pred) => pred,
            Err(e @ FilterError::DimensionMismatch { .. }) => {
                warn!("UKF prediction skipped: {}", e);
                prev.clone()
            }
            Err(e) => {
                debug!("UKF prediction skipped: {}", e);
                prev.clone()
            }
        }
    }

    fn skip_flags(&self) -> SkipFlags {
        self.flags
    }

    fn skip_flags_mut(&mut self) -> &mut SkipFlags {
        &mut self.flags
    }

    fn state_model(&self) -> &dyn StateModel {
        match &self.model {
            PredictionModel::Generic(model) => model.as_ref(),
            PredictionModel::Additive(model) => model,
        }
    }
}
