//! Linear time-invariant measurement model
//!
//! `y = H x + v`, `v ~ N(0, R)`.

use nalgebra::DMatrix;

use crate::common::linalg::psd_sqrt;
use crate::common::rng::{gaussian_noise, SimpleRng};
use crate::filter::errors::ModelError;
use crate::models::measurement::{AdditiveMeasurementModel, MeasurementModel};
use crate::types::{CircularType, Data, VectorDescription};

/// LTI sensor fed through [`freeze`](MeasurementModel::freeze)
#[derive(Debug, Clone)]
pub struct LinearMeasurementModel {
    h: DMatrix<f64>,
    r: DMatrix<f64>,
    sqrt_r: DMatrix<f64>,
    rng: SimpleRng,
    state_description: VectorDescription,
    measurement_description: VectorDescription,
    measurement: Option<DMatrix<f64>>,
}

impl LinearMeasurementModel {
    /// # Arguments
    /// * `measurement_matrix` - `H`, one row per measured quantity
    /// * `noise_covariance` - `R`, square with as many rows as `H`
    /// * `state_description` - Layout of the measured state
    /// * `seed` - Seed of the model's noise source
    pub fn new(
        measurement_matrix: DMatrix<f64>,
        noise_covariance: DMatrix<f64>,
        state_description: VectorDescription,
        seed: u64,
    ) -> Result<Self, ModelError> {
        if measurement_matrix.ncols() != state_description.total_size() {
            return Err(ModelError::DimensionMismatch {
                expected: state_description.total_size(),
                actual: measurement_matrix.ncols(),
                context: "measurement matrix columns".to_string(),
            });
        }
        if noise_covariance.shape() != (measurement_matrix.nrows(), measurement_matrix.nrows()) {
            return Err(ModelError::DimensionMismatch {
                expected: measurement_matrix.nrows(),
                actual: noise_covariance.nrows(),
                context: "measurement noise covariance".to_string(),
            });
        }
        let sqrt_r = psd_sqrt(&noise_covariance).ok_or_else(|| ModelError::Configuration {
            description: "measurement noise covariance is not positive semi-definite".to_string(),
        })?;

        let measurement_description = measured_layout(&measurement_matrix, &state_description)?;

        Ok(Self {
            h: measurement_matrix,
            r: noise_covariance,
            sqrt_r,
            rng: SimpleRng::new(seed),
            state_description: state_description.noiseless(),
            measurement_description,
            measurement: None,
        })
    }

    /// Direct observation of a scalar state with standard deviation `sigma`
    pub fn scalar(sigma: f64, seed: u64) -> Result<Self, ModelError> {
        Self::new(
            DMatrix::from_element(1, 1, 1.0),
            DMatrix::from_element(1, 1, sigma * sigma),
            VectorDescription::linear(1),
            seed,
        )
    }

    #[inline]
    pub fn measurement_matrix(&self) -> &DMatrix<f64> {
        &self.h
    }

    /// `H x + v` for every column of `true_states`
    pub fn simulate(&mut self, true_states: &DMatrix<f64>) -> DMatrix<f64> {
        let noise = gaussian_noise(&mut self.rng, &self.sqrt_r, true_states.ncols());
        &self.h * true_states + noise
    }
}

/// Measurement layout from `H`: a row measures a circular quantity when
/// its dominant column lies in the circular part of the state.
///
/// Circular rows must come after every linear row, as in any
/// [`VectorDescription`].
fn measured_layout(h: &DMatrix<f64>, state: &VectorDescription) -> Result<VectorDescription, ModelError> {
    let mut linear = 0;
    let mut circular = 0;
    for (r, row) in h.row_iter().enumerate() {
        let dominant = row.iamax_full().1;
        if dominant >= state.linear_size() {
            circular += 1;
        } else if circular > 0 {
            return Err(ModelError::Configuration {
                description: format!(
                    "measurement matrix row {} is linear but follows a circular row; circular rows must come last",
                    r
                ),
            });
        } else {
            linear += 1;
        }
    }
    Ok(VectorDescription::new(linear, circular, 0, CircularType::Euler))
}

impl MeasurementModel for LinearMeasurementModel {
    fn freeze(&mut self, data: &Data) -> bool {
        match data.to_matrix() {
            Ok(m) if m.nrows() == self.h.nrows() => {
                self.measurement = Some(m);
                true
            }
            _ => false,
        }
    }

    fn measure(&self) -> Option<Data> {
        self.measurement.clone().map(Data::Matrix)
    }

    fn predicted_measure(&self, cur_states: &DMatrix<f64>) -> Option<Data> {
        let state_size = self.h.ncols();
        if cur_states.nrows() < state_size {
            return None;
        }
        let mut predicted = &self.h * cur_states.rows(0, state_size);
        let noise_rows = cur_states.nrows() - state_size;
        if noise_rows > 0 {
            if noise_rows != predicted.nrows() {
                return None;
            }
            predicted += cur_states.rows(state_size, noise_rows);
        }
        Some(Data::Matrix(predicted))
    }

    fn noise_covariance_matrix(&self) -> Result<DMatrix<f64>, ModelError> {
        Ok(self.r.clone())
    }

    fn noise_sample(&mut self, num: usize) -> Result<DMatrix<f64>, ModelError> {
        Ok(gaussian_noise(&mut self.rng, &self.sqrt_r, num))
    }

    fn input_description(&self) -> VectorDescription {
        self.state_description.with_noise(self.r.nrows())
    }

    fn measurement_description(&self) -> VectorDescription {
        self.measurement_description
    }
}

impl AdditiveMeasurementModel for LinearMeasurementModel {}
