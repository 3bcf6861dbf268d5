//! Simulated ground truth and sensors
//!
//! [`SimulatedStateModel`] drives a state model forward one step per
//! [`buffer_data`](SimulatedStateModel::buffer_data) call for a fixed
//! number of steps. [`SimulatedLinearSensor`] observes it through a
//! [`LinearMeasurementModel`] each time it is frozen.

use log::debug;
use nalgebra::{DMatrix, DVector};

use crate::filter::errors::ModelError;
use crate::models::linear::LinearMeasurementModel;
use crate::models::measurement::{AdditiveMeasurementModel, MeasurementModel};
use crate::models::state::StateModel;
use crate::types::{Data, VectorDescription};

/// Target simulator built on a [`StateModel`]
pub struct SimulatedStateModel {
    model: Box<dyn StateModel>,
    state: DMatrix<f64>,
    simulation_steps: usize,
    current_step: usize,
}

impl SimulatedStateModel {
    /// # Arguments
    /// * `model` - Transition used to move the target
    /// * `initial_state` - Target state before the first step
    /// * `simulation_steps` - Number of states the simulator produces
    pub fn new(model: Box<dyn StateModel>, initial_state: DVector<f64>, simulation_steps: usize) -> Result<Self, ModelError> {
        let size = model.state_description().total_size();
        if initial_state.len() != size {
            return Err(ModelError::DimensionMismatch {
                expected: size,
                actual: initial_state.len(),
                context: "simulated initial state".to_string(),
            });
        }
        Ok(Self {
            model,
            state: DMatrix::from_column_slice(size, 1, initial_state.as_slice()),
            simulation_steps,
            current_step: 0,
        })
    }

    /// Advance the target by one step
    ///
    /// Returns `false` once all simulation steps have been produced or the
    /// transition fails.
    pub fn buffer_data(&mut self) -> bool {
        if self.current_step >= self.simulation_steps {
            return false;
        }
        match self.model.motion(&self.state) {
            Ok(next) => {
                self.state = next;
                self.current_step += 1;
                true
            }
            Err(e) => {
                debug!("Simulated target did not move: {}", e);
                false
            }
        }
    }

    /// Most recently buffered target state (one column)
    #[inline]
    pub fn data(&self) -> &DMatrix<f64> {
        &self.state
    }

    #[inline]
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn state_model(&self) -> &dyn StateModel {
        self.model.as_ref()
    }
}

/// Linear sensor reading a simulated target
pub struct SimulatedLinearSensor {
    target: SimulatedStateModel,
    sensor: LinearMeasurementModel,
    measurement: Option<DMatrix<f64>>,
}

impl SimulatedLinearSensor {
    pub fn new(target: SimulatedStateModel, sensor: LinearMeasurementModel) -> Result<Self, ModelError> {
        let expected = target.state_model().state_description().total_size();
        let actual = sensor.measurement_matrix().ncols();
        if expected != actual {
            return Err(ModelError::DimensionMismatch {
                expected,
                actual,
                context: "simulated sensor measurement matrix".to_string(),
            });
        }
        Ok(Self {
            target,
            sensor,
            measurement: None,
        })
    }

    /// Sensor observing the whole state directly with standard deviation `sigma`
    pub fn direct(target: SimulatedStateModel, sigma: f64, seed: u64) -> Result<Self, ModelError> {
        let description = target.state_model().state_description();
        let n = description.total_size();
        let sensor = LinearMeasurementModel::new(
            DMatrix::identity(n, n),
            DMatrix::from_diagonal_element(n, n, sigma * sigma),
            description,
            seed,
        )?;
        Self::new(target, sensor)
    }

    /// Current true target state
    pub fn ground_truth(&self) -> &DMatrix<f64> {
        self.target.data()
    }

    pub fn target(&self) -> &SimulatedStateModel {
        &self.target
    }
}

impl MeasurementModel for SimulatedLinearSensor {
    fn freeze(&mut self, _data: &Data) -> bool {
        if !self.target.buffer_data() {
            self.measurement = None;
            return false;
        }
        let truth = self.target.data().clone();
        self.measurement = Some(self.sensor.simulate(&truth));
        true
    }

    fn measure(&self) -> Option<Data> {
        self.measurement.clone().map(Data::Matrix)
    }

    fn predicted_measure(&self, cur_states: &DMatrix<f64>) -> Option<Data> {
        self.sensor.predicted_measure(cur_states)
    }

    fn innovation(&self, predicted: &Data, measured: &Data) -> Option<Data> {
        self.sensor.innovation(predicted, measured)
    }

    fn noise_covariance_matrix(&self) -> Result<DMatrix<f64>, ModelError> {
        self.sensor.noise_covariance_matrix()
    }

    fn noise_sample(&mut self, num: usize) -> Result<DMatrix<f64>, ModelError> {
        self.sensor.noise_sample(num)
    }

    fn set_property(&mut self, property: &str) -> bool {
        self.sensor.set_property(property)
    }

    fn input_description(&self) -> VectorDescription {
        self.sensor.input_description()
    }

    fn measurement_description(&self) -> VectorDescription {
        self.sensor.measurement_description()
    }
}

impl AdditiveMeasurementModel for SimulatedLinearSensor {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::nonlinear_scalar::NonLinearScalarModel;

    fn target(steps: usize) -> SimulatedStateModel {
        let model = Box::new(NonLinearScalarModel::new(1.0, 3).unwrap());
        SimulatedStateModel::new(model, DVector::from_vec(vec![0.1]), steps).unwrap()
    }

    #[test]
    fn test_simulation_stops_after_last_step() {
        let mut sim = target(2);
        assert!(sim.buffer_data());
        assert!(sim.buffer_data());
        assert!(!sim.buffer_data());
        assert_eq!(sim.current_step(), 2);
    }

    #[test]
    fn test_rejects_wrong_initial_state() {
        let model = Box::new(NonLinearScalarModel::new(1.0, 3).unwrap());
        assert!(SimulatedStateModel::new(model, DVector::zeros(2), 5).is_err());
    }

    #[test]
    fn test_sensor_measures_only_after_freeze() {
        let mut sensor = SimulatedLinearSensor::direct(target(3), 1.0, 5).unwrap();
        assert!(sensor.measure().is_none());
        assert!(sensor.freeze(&Data::Empty));
        let y = sensor.measure().unwrap().to_matrix().unwrap();
        assert_eq!(y.shape(), (1, 1));
        assert_eq!(sensor.ground_truth().shape(), (1, 1));
        assert_eq!(sensor.target().current_step(), 1);
        assert_eq!(sensor.measurement_description().total_size(), 1);
    }

    #[test]
    fn test_sensor_is_reproducible() {
        let mut a = SimulatedLinearSensor::direct(target(10), 1.0, 5).unwrap();
        let mut b = SimulatedLinearSensor::direct(target(10), 1.0, 5).unwrap();
        for _ in 0..10 {
            a.freeze(&Data::Empty);
            b.freeze(&Data::Empty);
            assert_eq!(a.measure(), b.measure());
        }
        assert!(!a.freeze(&Data::Empty));
        assert!(a.measure().is_none());
    }

    #[test]
    fn test_sensor_noise_sample_leaves_target_untouched() {
        let mut sensor = SimulatedLinearSensor::direct(target(3), 2.0, 5).unwrap();
        let noise = sensor.noise_sample(6).unwrap();
        assert_eq!(noise.shape(), (1, 6));
        assert_eq!(sensor.target().current_step(), 0);
        assert!(sensor.measure().is_none());
    }
}
