//! Model decorators
//!
//! [`StateModelDecorator`] and [`MeasurementModelDecorator`] own an inner
//! model and forward every contract method to it. The behaviour added on
//! top lives in a decoration ([`StateDecoration`], [`MeasurementDecoration`])
//! whose methods all default to plain forwarding, so a decoration only
//! overrides what it changes.
//!
//! Decorated models keep the capabilities of the inner model: decorating an
//! [`AdditiveStateModel`] yields an [`AdditiveStateModel`], and likewise for
//! [`HasTransitionProbability`] and [`AdditiveMeasurementModel`].

use nalgebra::{DMatrix, DVector};

use crate::filter::errors::ModelError;
use crate::models::measurement::{AdditiveMeasurementModel, MeasurementModel};
use crate::models::state::{AdditiveStateModel, HasTransitionProbability, StateModel};
use crate::types::{Data, VectorDescription};

/// Overridable layer around a [`StateModel`]
pub trait StateDecoration: Send {
    fn propagate(&self, inner: &dyn StateModel, cur_states: &DMatrix<f64>) -> DMatrix<f64> {
        inner.propagate(cur_states)
    }

    fn motion(
        &mut self,
        inner: &mut dyn StateModel,
        cur_states: &DMatrix<f64>,
    ) -> Result<DMatrix<f64>, ModelError> {
        inner.motion(cur_states)
    }

    fn noise_covariance_matrix(&self, inner: &dyn StateModel) -> Result<DMatrix<f64>, ModelError> {
        inner.noise_covariance_matrix()
    }

    fn noise_sample(&mut self, inner: &mut dyn StateModel, num: usize) -> Result<DMatrix<f64>, ModelError> {
        inner.noise_sample(num)
    }

    fn set_property(&mut self, inner: &mut dyn StateModel, property: &str) -> bool {
        inner.set_property(property)
    }

    fn state_description(&self, inner: &dyn StateModel) -> VectorDescription {
        inner.state_description()
    }

    fn input_description(&self, inner: &dyn StateModel) -> VectorDescription {
        inner.input_description()
    }
}

/// State model wrapped by a decoration
pub struct StateModelDecorator<D, M = Box<dyn StateModel>> {
    inner: M,
    decoration: D,
}

impl<D: StateDecoration, M: StateModel> StateModelDecorator<D, M> {
    pub fn new(inner: M, decoration: D) -> Self {
        Self { inner, decoration }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    pub fn decoration(&self) -> &D {
        &self.decoration
    }

    pub fn into_inner(self) -> M {
        self.inner
    }
}

impl<D: StateDecoration, M: StateModel> StateModel for StateModelDecorator<D, M> {
    fn propagate(&self, cur_states: &DMatrix<f64>) -> DMatrix<f64> {
        self.decoration.propagate(&self.inner, cur_states)
    }

    fn motion(&mut self, cur_states: &DMatrix<f64>) -> Result<DMatrix<f64>, ModelError> {
        self.decoration.motion(&mut self.inner, cur_states)
    }

    fn noise_covariance_matrix(&self) -> Result<DMatrix<f64>, ModelError> {
        self.decoration.noise_covariance_matrix(&self.inner)
    }

    fn noise_sample(&mut self, num: usize) -> Result<DMatrix<f64>, ModelError> {
        self.decoration.noise_sample(&mut self.inner, num)
    }

    fn set_property(&mut self, property: &str) -> bool {
        self.decoration.set_property(&mut self.inner, property)
    }

    fn state_description(&self) -> VectorDescription {
        self.decoration.state_description(&self.inner)
    }

    fn input_description(&self) -> VectorDescription {
        self.decoration.input_description(&self.inner)
    }
}

impl<D: StateDecoration, M: AdditiveStateModel> AdditiveStateModel for StateModelDecorator<D, M> {}

impl<D: StateDecoration, M: HasTransitionProbability> HasTransitionProbability for StateModelDecorator<D, M> {
    fn transition_probability(&self, prev_states: &DMatrix<f64>, cur_states: &DMatrix<f64>) -> DVector<f64> {
        self.inner.transition_probability(prev_states, cur_states)
    }
}

/// Overridable layer around a [`MeasurementModel`]
pub trait MeasurementDecoration: Send {
    fn freeze(&mut self, inner: &mut dyn MeasurementModel, data: &Data) -> bool {
        inner.freeze(data)
    }

    fn measure(&self, inner: &dyn MeasurementModel) -> Option<Data> {
        inner.measure()
    }

    fn predicted_measure(&self, inner: &dyn MeasurementModel, cur_states: &DMatrix<f64>) -> Option<Data> {
        inner.predicted_measure(cur_states)
    }

    fn innovation(&self, inner: &dyn MeasurementModel, predicted: &Data, measured: &Data) -> Option<Data> {
        inner.innovation(predicted, measured)
    }

    fn noise_covariance_matrix(&self, inner: &dyn MeasurementModel) -> Result<DMatrix<f64>, ModelError> {
        inner.noise_covariance_matrix()
    }

    fn noise_sample(&mut self, inner: &mut dyn MeasurementModel, num: usize) -> Result<DMatrix<f64>, ModelError> {
        inner.noise_sample(num)
    }

    fn set_property(&mut self, inner: &mut dyn MeasurementModel, property: &str) -> bool {
        inner.set_property(property)
    }

    fn input_description(&self, inner: &dyn MeasurementModel) -> VectorDescription {
        inner.input_description()
    }

    fn measurement_description(&self, inner: &dyn MeasurementModel) -> VectorDescription {
        inner.measurement_description()
    }
}

/// Measurement model wrapped by a decoration
pub struct MeasurementModelDecorator<D, M = Box<dyn MeasurementModel>> {
    inner: M,
    decoration: D,
}

impl<D: MeasurementDecoration, M: MeasurementModel> MeasurementModelDecorator<D, M> {
    pub fn new(inner: M, decoration: D) -> Self {
        Self { inner, decoration }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    pub fn decoration(&self) -> &D {
        &self.decoration
    }

    pub fn into_inner(self) -> M {
        self.inner
    }
}

impl<D: MeasurementDecoration, M: MeasurementModel> MeasurementModel for MeasurementModelDecorator<D, M> {
    fn freeze(&mut self, data: &Data) -> bool {
        self.decoration.freeze(&mut self.inner, data)
    }

    fn measure(&self) -> Option<Data> {
        self.decoration.measure(&self.inner)
    }

    fn predicted_measure(&self, cur_states: &DMatrix<f64>) -> Option<Data> {
        self.decoration.predicted_measure(&self.inner, cur_states)
    }

    fn innovation(&self, predicted: &Data, measured: &Data) -> Option<Data> {
        self.decoration.innovation(&self.inner, predicted, measured)
    }

    fn noise_covariance_matrix(&self) -> Result<DMatrix<f64>, ModelError> {
        self.decoration.noise_covariance_matrix(&self.inner)
    }

    fn noise_sample(&mut self, num: usize) -> Result<DMatrix<f64>, ModelError> {
        self.decoration.noise_sample(&mut self.inner, num)
    }

    fn set_property(&mut self, property: &str) -> bool {
        self.decoration.set_property(&mut self.inner, property)
    }

    fn input_description(&self) -> VectorDescription {
        self.decoration.input_description(&self.inner)
    }

    fn measurement_description(&self) -> VectorDescription {
        self.decoration.measurement_description(&self.inner)
    }
}

impl<D: MeasurementDecoration, M: AdditiveMeasurementModel> AdditiveMeasurementModel
    for MeasurementModelDecorator<D, M>
{
}

/// Decoration that changes nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct Forward;

impl StateDecoration for Forward {}

impl MeasurementDecoration for Forward {}

/// Adds a known input to the states before they reach the inner model
#[derive(Debug, Clone)]
pub struct InputInjection {
    input: DVector<f64>,
}

impl InputInjection {
    pub fn new(input: DVector<f64>) -> Self {
        Self { input }
    }

    fn apply(&self, cur_states: &DMatrix<f64>) -> DMatrix<f64> {
        let mut states = cur_states.clone();
        let rows = self.input.len().min(states.nrows());
        for mut col in states.column_iter_mut() {
            let mut head = col.rows_mut(0, rows);
            head += self.input.rows(0, rows);
        }
        states
    }
}

impl StateDecoration for InputInjection {
    fn propagate(&self, inner: &dyn StateModel, cur_states: &DMatrix<f64>) -> DMatrix<f64> {
        inner.propagate(&self.apply(cur_states))
    }

    fn motion(
        &mut self,
        inner: &mut dyn StateModel,
        cur_states: &DMatrix<f64>,
    ) -> Result<DMatrix<f64>, ModelError> {
        inner.motion(&self.apply(cur_states))
    }
}

/// Scales the measurement noise covariance of the inner model
#[derive(Debug, Clone, Copy)]
pub struct NoiseInflation {
    factor: f64,
}

impl NoiseInflation {
    pub fn new(factor: f64) -> Self {
        Self { factor }
    }
}

impl MeasurementDecoration for NoiseInflation {
    fn noise_covariance_matrix(&self, inner: &dyn MeasurementModel) -> Result<DMatrix<f64>, ModelError> {
        inner.noise_covariance_matrix().map(|r| r * self.factor)
    }
}
