//! Unscented Kalman correction
//!
//! Mirrors [`UkfPrediction`](crate::components::UkfPrediction) on the
//! measurement side:
//! - **Generic**: the measurement noise covariance is appended to the
//!   predicted state and the model consumes the noise entries.
//! - **Additive**: sigma points go through the noise-free measurement map
//!   and the noise covariance is added to the predicted measurement.
//!
//! Any transient failure (no measurement, failed transform, no innovation,
//! singular innovation covariance) turns the correction into a no-op.

use log::{debug, warn};
use nalgebra::{DMatrix, DVector, Vector3, Vector4};

use crate::common::directional::{directional_add, sum_quaternion_rotation_vector};
use crate::common::linalg::{gaussian_pdf, symmetrize};
use crate::components::sigma_point::{unscented_transform, UtWeight};
use crate::filter::config::{UkfCorrectionConfig, UnscentedParams};
use crate::filter::errors::{FilterError, ModelError};
use crate::filter::traits::GaussianCorrection;
use crate::models::{AdditiveMeasurementModel, MeasurementModel};
use crate::types::{Data, GaussianMixture};

enum CorrectionModel {
    Generic(Box<dyn MeasurementModel>),
    Additive(Box<dyn AdditiveMeasurementModel>),
}

/// Innovations and predicted measurement covariances of the last correction
struct Innovations {
    values: DMatrix<f64>,
    covariances: Vec<DMatrix<f64>>,
}

/// UKF correction step
pub struct UkfCorrection {
    model: CorrectionModel,
    config: UkfCorrectionConfig,
    weight: UtWeight,
    skip: bool,
    last: Option<Innovations>,
}

impl UkfCorrection {
    /// Generic correction with noise augmentation
    ///
    /// Sigma-point weights are sized from the model's input description.
    /// They are refreshed on every step only when
    /// `config.update_weights_online` is set.
    pub fn generic(model: Box<dyn MeasurementModel>, config: UkfCorrectionConfig) -> Result<Self, FilterError> {
        // Fail early rather than on the first measurement
        model.noise_covariance_matrix()?;
        let weight = UtWeight::from_description(&model.input_description(), config.params);
        Ok(Self {
            model: CorrectionModel::Generic(model),
            config,
            weight,
            skip: false,
            last: None,
        })
    }

    /// Correction for measurement models with additive noise
    pub fn additive(model: Box<dyn AdditiveMeasurementModel>, params: UnscentedParams) -> Self {
        let weight = UtWeight::from_description(&model.input_description().noiseless(), params);
        Self {
            model: CorrectionModel::Additive(model),
            config: UkfCorrectionConfig {
                params,
                update_weights_online: false,
            },
            weight,
            skip: false,
            last: None,
        }
    }

    #[inline]
    pub fn config(&self) -> &UkfCorrectionConfig {
        &self.config
    }

    /// Predicted measurement statistics and cross-covariances
    fn predicted_measurement(
        &mut self,
        pred: &GaussianMixture,
    ) -> Result<(GaussianMixture, Vec<DMatrix<f64>>), FilterError> {
        let out = match &self.model {
            CorrectionModel::Generic(model) => {
                let r = model.noise_covariance_matrix()?;
                let mut augmented = pred.clone();
                augmented.augment_with_noise(&r);

                if self.config.update_weights_online {
                    self.weight = UtWeight::from_description(&model.input_description(), self.config.params);
                }
                if self.weight.dim() != augmented.dim_covariance() {
                    warn!(
                        "Sigma-point weights sized for {} but the augmented state has {} degrees of freedom",
                        self.weight.dim(),
                        augmented.dim_covariance()
                    );
                }

                let output = model.measurement_description();
                unscented_transform(&augmented, &self.weight, &output, None, |x| measure_batch(model.as_ref(), x))?
            }
            CorrectionModel::Additive(model) => {
                let r = model.noise_covariance_matrix()?;
                let output = model.measurement_description();
                unscented_transform(pred, &self.weight, &output, Some(&r), |x| measure_batch(model, x))?
            }
        };
        Ok((out.mixture, out.cross_covariances))
    }

    fn try_correct(&mut self, pred: &GaussianMixture, measurement: &Data) -> Result<GaussianMixture, FilterError> {
        let (predicted_meas, pxy) = self.predicted_measurement(pred)?;

        let innovations = self
            .measurement_model()
            .innovation(&Data::Matrix(predicted_meas.means()), measurement)
            .ok_or(ModelError::unsupported("innovation"))?
            .to_matrix()?;
        if innovations.ncols() != pred.num_components() {
            return Err(FilterError::dimension(
                pred.num_components(),
                innovations.ncols(),
                "innovation columns",
            ));
        }

        let mut corrected = pred.clone();
        for i in 0..pred.num_components() {
            let py = predicted_meas.covariance(i);
            let gain = kalman_gain(&pxy[i], py)?;
            let correction = &gain * innovations.column(i);

            let mean = add_correction(pred, pred.mean(i), &correction);
            let covariance = symmetrize(&(pred.covariance(i) - &gain * py * gain.transpose()));
            corrected.set_moments(i, mean, covariance);
        }

        let covariances = (0..predicted_meas.num_components())
            .map(|i| predicted_meas.covariance(i).clone())
            .collect();
        self.last = Some(Innovations {
            values: innovations,
            covariances,
        });

        Ok(corrected)
    }
}

/// Run the measurement map on a batch of sigma points
fn measure_batch(model: &dyn MeasurementModel, states: &DMatrix<f64>) -> Result<DMatrix<f64>, FilterError> {
    let measured = model
        .predicted_measure(states)
        .ok_or(ModelError::unsupported("predicted_measure"))?;
    Ok(measured.to_matrix()?)
}

/// `K = Pxy · Py⁻¹`
fn kalman_gain(pxy: &DMatrix<f64>, py: &DMatrix<f64>) -> Result<DMatrix<f64>, FilterError> {
    // K Py = Pxy  <=>  Py Kᵀ = Pxyᵀ (Py symmetric)
    if let Some(chol) = py.clone().cholesky() {
        return Ok(chol.solve(&pxy.transpose()).transpose());
    }
    let inverse = py.clone().try_inverse().ok_or_else(|| FilterError::SingularMatrix {
        context: "predicted measurement covariance".to_string(),
    })?;
    Ok(pxy * inverse)
}

/// Compose `mean` (storage layout) with `correction` (intrinsic layout)
fn add_correction(layout: &GaussianMixture, mean: &DVector<f64>, correction: &DVector<f64>) -> DVector<f64> {
    let linear = layout.dim_linear();
    let mut out = mean.clone();
    for r in 0..linear {
        out[r] += correction[r];
    }

    let circular = layout.dim_circular();
    if circular == 0 {
        return out;
    }
    if layout.use_quaternion() {
        for k in 0..circular {
            let row = linear + 4 * k;
            let q: Vector4<f64> = mean.fixed_rows::<4>(row).into_owned();
            let r: Vector3<f64> = correction.fixed_rows::<3>(linear + 3 * k).into_owned();
            out.fixed_rows_mut::<4>(row)
                .copy_from(&sum_quaternion_rotation_vector(&q, &r));
        }
    } else {
        let angles = mean.rows(linear, circular).into_owned();
        let delta = correction.rows(linear, circular).into_owned();
        out.rows_mut(linear, circular)
            .copy_from(&directional_add(&angles, &delta));
    }
    out
}

impl GaussianCorrection for UkfCorrection {
    fn correct_step(&mut self, pred: &GaussianMixture) -> GaussianMixture {
        let Some(measurement) = self.measurement_model().measure() else {
            debug!("UKF correction skipped: no measurement available");
            self.last = None;
            return pred.clone();
        };

        match self.try_correct(pred, &measurement) {
            Ok(corrected) => corrected,
            Err(e) => {
                debug!("UKF correction skipped: {}", e);
                self.last = None;
                pred.clone()
            }
        }
    }

    fn measurement_model(&self) -> &dyn MeasurementModel {
        match &self.model {
            CorrectionModel::Generic(model) => model.as_ref(),
            CorrectionModel::Additive(model) => model,
        }
    }

    fn measurement_model_mut(&mut self) -> &mut dyn MeasurementModel {
        match &mut self.model {
            CorrectionModel::Generic(model) => model.as_mut(),
            CorrectionModel::Additive(model) => model,
        }
    }

    fn is_skipping(&self) -> bool {
        self.skip
    }

    fn skip(&mut self, status: bool) {
        self.skip = status;
    }

    /// Density of each component's innovation under its predicted measurement covariance
    fn likelihood(&self) -> Option<DVector<f64>> {
        let last = self.last.as_ref()?;
        let zero = DVector::zeros(last.values.nrows());
        Some(DVector::from_iterator(
            last.values.ncols(),
            last.values
                .column_iter()
                .zip(last.covariances.iter())
                .map(|(nu, py)| gaussian_pdf(&nu.into_owned(), &zero, py)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LinearMeasurementModel;
    use crate::types::{CircularType, VectorDescription};
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn scalar_sensor(measured: Option<f64>) -> LinearMeasurementModel {
        let mut sensor = LinearMeasurementModel::scalar(1.0, 1).unwrap();
        if let Some(y) = measured {
            assert!(sensor.freeze(&Data::Scalar(y)));
        }
        sensor
    }

    fn prior() -> GaussianMixture {
        GaussianMixture::from_gaussian(DVector::from_vec(vec![0.0]), DMatrix::from_element(1, 1, 1.0))
    }

    #[test]
    fn test_additive_matches_kalman_update() {
        let mut correction = UkfCorrection::additive(Box::new(scalar_sensor(Some(2.0))), UnscentedParams::default());
        let cor = correction.correct(&prior());

        // K = P / (P + R) = 0.5
        assert_abs_diff_eq!(cor.mean(0)[0], 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(cor.covariance(0)[(0, 0)], 0.5, epsilon = 1e-10);
    }

    #[test]
    fn test_generic_matches_additive_on_linear_sensor() {
        let mut generic = UkfCorrection::generic(Box::new(scalar_sensor(Some(2.0))), UkfCorrectionConfig::default()).unwrap();
        let mut additive = UkfCorrection::additive(Box::new(scalar_sensor(Some(2.0))), UnscentedParams::default());

        let a = generic.correct(&prior());
        let b = additive.correct(&prior());
        assert_abs_diff_eq!(a.mean(0)[0], b.mean(0)[0], epsilon = 1e-10);
        assert_abs_diff_eq!(a.covariance(0)[(0, 0)], b.covariance(0)[(0, 0)], epsilon = 1e-10);
    }

    #[test]
    fn test_no_measurement_is_noop() {
        let mut correction = UkfCorrection::additive(Box::new(scalar_sensor(None)), UnscentedParams::default());
        let mut pred = GaussianMixture::new(2, 1, 1, false);
        pred.set_moments(0, DVector::from_vec(vec![0.3, 1.0]), DMatrix::identity(2, 2));
        pred.set_moments(1, DVector::from_vec(vec![-1.7, -0.2]), DMatrix::identity(2, 2) * 3.0);

        let cor = correction.correct_step(&pred);
        assert_eq!(cor, pred);
        assert!(correction.likelihood().is_none());
    }

    #[test]
    fn test_non_psd_prediction_is_noop() {
        let mut correction = UkfCorrection::additive(Box::new(scalar_sensor(Some(1.0))), UnscentedParams::default());
        let pred = GaussianMixture::from_gaussian(DVector::from_vec(vec![0.0]), DMatrix::from_element(1, 1, -4.0));
        assert_eq!(correction.correct(&pred), pred);
    }

    #[test]
    fn test_skip_returns_prediction() {
        let mut correction = UkfCorrection::additive(Box::new(scalar_sensor(Some(5.0))), UnscentedParams::default());
        correction.skip(true);
        assert_eq!(correction.correct(&prior()), prior());
        correction.skip(false);
        assert_ne!(correction.correct(&prior()), prior());
    }

    #[test]
    fn test_likelihood_per_component() {
        let mut correction = UkfCorrection::additive(Box::new(scalar_sensor(Some(2.0))), UnscentedParams::default());
        correction.correct(&prior());

        // Innovation 2, Py = P + R = 2
        let expected = (-(2.0_f64 * 2.0) / (2.0 * 2.0)).exp() / (2.0 * PI * 2.0).sqrt();
        let likelihood = correction.likelihood().unwrap();
        assert_eq!(likelihood.len(), 1);
        assert_abs_diff_eq!(likelihood[0], expected, epsilon = 1e-10);
    }

    #[test]
    fn test_angular_state_stays_bounded() {
        let state = VectorDescription::new(0, 1, 0, CircularType::Euler);
        let mut sensor = LinearMeasurementModel::new(
            DMatrix::from_element(1, 1, 1.0),
            DMatrix::from_element(1, 1, 0.01),
            state,
            1,
        )
        .unwrap();
        // Measured just across the ±π boundary
        sensor.freeze(&Data::Scalar(-PI + 0.05));

        let mut pred = GaussianMixture::new(1, 0, 1, false);
        pred.set_moments(0, DVector::from_vec(vec![PI - 0.05]), DMatrix::from_element(1, 1, 0.01));

        let mut correction = UkfCorrection::additive(Box::new(sensor), UnscentedParams::default());
        let cor = correction.correct(&pred);
        let angle = cor.mean(0)[0];
        assert!(angle > -PI && angle <= PI);
        // Halfway between the two, i.e. on the boundary
        assert_abs_diff_eq!(angle.abs(), PI, epsilon = 1e-6);
    }

    #[test]
    fn test_quaternion_block_is_composed_on_the_manifold() {
        // State [x, q]: the sensor sees x only, the x-axis rotation is correlated with it
        let state = VectorDescription::new(1, 1, 0, CircularType::Quaternion);
        let h = DMatrix::from_row_slice(1, 5, &[1.0, 0.0, 0.0, 0.0, 0.0]);
        let mut sensor = LinearMeasurementModel::new(h, DMatrix::from_element(1, 1, 1.0), state, 1).unwrap();
        sensor.freeze(&Data::Scalar(2.0));

        let mut covariance = DMatrix::identity(4, 4);
        covariance[(0, 1)] = 0.5;
        covariance[(1, 0)] = 0.5;
        let mut pred = GaussianMixture::new(1, 1, 1, true);
        pred.set_moments(0, DVector::from_vec(vec![0.0, 1.0, 0.0, 0.0, 0.0]), covariance);

        let mut correction = UkfCorrection::additive(Box::new(sensor), UnscentedParams::default());
        let cor = correction.correct(&pred);

        // Py = 2, K = [0.5, 0.25, 0, 0], innovation 2
        let mean = cor.mean(0);
        assert_eq!(mean.len(), 5);
        assert_abs_diff_eq!(mean[0], 1.0, epsilon = 1e-9);
        let q = mean.fixed_rows::<4>(1).into_owned();
        assert_abs_diff_eq!(q.norm(), 1.0, epsilon = 1e-12);
        // Rotation of 0.5 rad about x
        assert_abs_diff_eq!(q[0], 0.25_f64.cos(), epsilon = 1e-9);
        assert_abs_diff_eq!(q[1], 0.25_f64.sin(), epsilon = 1e-9);
        assert_abs_diff_eq!(q[2], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(q[3], 0.0, epsilon = 1e-9);

        let p = cor.covariance(0);
        assert_eq!(p.shape(), (4, 4));
        assert_abs_diff_eq!(p[(0, 0)], 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(p[(0, 1)], 0.25, epsilon = 1e-9);
        assert_abs_diff_eq!(p[(1, 1)], 0.875, epsilon = 1e-9);
        assert_abs_diff_eq!(p[(2, 2)], 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p[(3, 3)], 1.0, epsilon = 1e-9);
    }
}
