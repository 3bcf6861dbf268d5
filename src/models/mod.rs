//! State and measurement models
//!
//! Contracts:
//! - [`StateModel`], [`AdditiveStateModel`], [`HasTransitionProbability`], [`ExogenousModel`]
//! - [`MeasurementModel`], [`AdditiveMeasurementModel`]
//! - [`LikelihoodModel`]
//!
//! Decorators wrap an owned model and forward everything by default, see
//! [`decorator`]. The remaining modules are reference models used by the
//! tests and benchmarks.

pub mod decorator;
pub mod likelihood;
pub mod linear;
pub mod measurement;
pub mod nonlinear_scalar;
pub mod simulated;
pub mod state;

pub use decorator::{
    Forward, InputInjection, MeasurementDecoration, MeasurementModelDecorator, NoiseInflation,
    StateDecoration, StateModelDecorator,
};
pub use likelihood::{GaussianLikelihood, LikelihoodModel};
pub use linear::LinearMeasurementModel;
pub use measurement::{AdditiveMeasurementModel, MeasurementModel};
pub use nonlinear_scalar::NonLinearScalarModel;
pub use simulated::{SimulatedLinearSensor, SimulatedStateModel};
pub use state::{AdditiveStateModel, ConstantInput, ExogenousModel, HasTransitionProbability, StateModel};
