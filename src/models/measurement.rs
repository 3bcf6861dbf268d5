//! Observation contracts
//!
//! A [`MeasurementModel`] is pulled, not pushed: [`freeze`](MeasurementModel::freeze)
//! latches the latest measurement and [`measure`](MeasurementModel::measure)
//! returns it until the next freeze.

use nalgebra::DMatrix;

use crate::common::directional::wrap_angle;
use crate::filter::errors::ModelError;
use crate::types::{Data, VectorDescription};

/// Stochastic observation of the state
pub trait MeasurementModel: Send {
    /// Make the latest measurement available
    ///
    /// `data` is optional auxiliary input; simulated sensors ignore it.
    fn freeze(&mut self, data: &Data) -> bool;

    /// Latest frozen measurement, `None` if nothing is available
    fn measure(&self) -> Option<Data>;

    /// Noise-free measurement of every column of `cur_states`
    ///
    /// As with [`StateModel::motion`](crate::models::StateModel::motion),
    /// noise-augmented columns have their noise entries consumed.
    fn predicted_measure(&self, cur_states: &DMatrix<f64>) -> Option<Data>;

    /// `measured - predicted` for every column of `predicted`
    ///
    /// Linear rows are subtracted directly, Euler angle rows are wrapped
    /// into `(-π, π]`. Quaternion measurements need a model-specific rule.
    fn innovation(&self, predicted: &Data, measured: &Data) -> Option<Data> {
        let predicted = predicted.to_matrix().ok()?;
        let measured = measured.to_matrix().ok()?;
        if measured.ncols() != 1 || measured.nrows() != predicted.nrows() {
            return None;
        }

        let description = self.measurement_description();
        if description.is_quaternion() && description.circular_components() > 0 {
            return None;
        }

        let linear = description.linear_size();
        let mut out = DMatrix::zeros(predicted.nrows(), predicted.ncols());
        for (j, col) in predicted.column_iter().enumerate() {
            for r in 0..predicted.nrows() {
                let d = measured[(r, 0)] - col[r];
                out[(r, j)] = if r < linear { d } else { wrap_angle(d) };
            }
        }
        Some(Data::Matrix(out))
    }

    /// Covariance of the measurement noise
    fn noise_covariance_matrix(&self) -> Result<DMatrix<f64>, ModelError> {
        Err(ModelError::unsupported("noise_covariance_matrix"))
    }

    /// Draw `num` measurement noise samples, one per column
    fn noise_sample(&mut self, _num: usize) -> Result<DMatrix<f64>, ModelError> {
        Err(ModelError::unsupported("noise_sample"))
    }

    fn set_property(&mut self, _property: &str) -> bool {
        false
    }

    /// Layout of the states accepted by [`predicted_measure`](Self::predicted_measure)
    fn input_description(&self) -> VectorDescription;

    fn measurement_description(&self) -> VectorDescription;
}

/// Measurement model with additive Gaussian noise: `y = h(x) + v`
///
/// The noise covariance must be available through
/// [`noise_covariance_matrix`](MeasurementModel::noise_covariance_matrix).
pub trait AdditiveMeasurementModel: MeasurementModel {}

impl<T: MeasurementModel + ?Sized> MeasurementModel for Box<T> {
    fn freeze(&mut self, data: &Data) -> bool {
        (**self).freeze(data)
    }

    fn measure(&self) -> Option<Data> {
        (**self).measure()
    }

    fn predicted_measure(&self, cur_states: &DMatrix<f64>) -> Option<Data> {
        (**self).predicted_measure(cur_states)
    }

    fn innovation(&self, predicted: &Data, measured: &Data) -> Option<Data> {
        (**self).innovation(predicted, measured)
    }

    fn noise_covariance_matrix(&self) -> Result<DMatrix<f64>, ModelError> {
        (**self).noise_covariance_matrix()
    }

    fn noise_sample(&mut self, num: usize) -> Result<DMatrix<f64>, ModelError> {
        (**self).noise_sample(num)
    }

    fn set_property(&mut self, property: &str) -> bool {
        (**self).set_property(property)
    }

    fn input_description(&self) -> VectorDescription {
        (**self).input_description()
    }

    fn measurement_description(&self) -> VectorDescription {
        (**self).measurement_description()
    }
}

impl<T: AdditiveMeasurementModel + ?Sized> AdditiveMeasurementModel for Box<T> {}
