/*!
# Bayes filters - Recursive Bayesian estimation library

Rust implementation of recursive Bayesian state estimation over states
with linear and circular (angle or quaternion) components.

## Features

- Unscented Kalman filtering with generic or additive-noise models
- Sequential importance sampling particle filters with resampling
- Angle-aware and quaternion-aware sigma-point statistics
- Model decorators that wrap and forward to an owned model
- A background-thread lifecycle (boot, run, reset, reboot, teardown)

## Modules

- [`types`] - Vector layouts, Gaussian mixtures, particle sets
- [`models`] - State, measurement and likelihood model contracts
- [`components`] - Unscented transform and the prediction/correction steps
- [`filter`] - Concrete filters, configuration, lifecycle
- [`reporter`] - Per-step observability
- [`common`] - Low-level utilities

## Example

```rust
use bayes_filters::{
    FilterHandle, GaussianFilter, GaussianFilterConfig, GaussianMixture, LinearMeasurementModel,
    NonLinearScalarModel, UkfCorrection, UkfPrediction, UnscentedParams,
};
use nalgebra::{DMatrix, DVector};

let params = UnscentedParams::default();
let prediction = UkfPrediction::additive(Box::new(NonLinearScalarModel::new(1.0, 1)?), params);
let correction = UkfCorrection::additive(Box::new(LinearMeasurementModel::scalar(1.0, 1)?), params);
let initial = GaussianMixture::from_gaussian(DVector::from_vec(vec![4.0]), DMatrix::from_element(1, 1, 4.0));

let filter = GaussianFilter::new(
    initial,
    Box::new(prediction),
    Box::new(correction),
    GaussianFilterConfig { max_steps: Some(10) },
);

let mut handle = FilterHandle::new(filter);
handle.boot()?;
handle.run();
handle.wait()?;
assert_eq!(handle.filtering_step(), 10);
# Ok::<(), bayes_filters::FilterError>(())
```
*/

// ============================================================================
// Core modules
// ============================================================================

/// Belief and layout types
pub mod types;

/// Model contracts, decorators and reference models
pub mod models;

/// Unscented transform, UKF and particle filter steps
pub mod components;

/// Concrete filters, step traits, configuration and lifecycle
pub mod filter;

/// Per-step observability
pub mod reporter;

/// Low-level utilities (linear algebra, directional statistics, RNG)
pub mod common;

// ============================================================================
// Re-exports for convenience
// ============================================================================

// Core types
pub use types::{CircularType, Data, GaussianComponent, GaussianMixture, ParticleSet, VectorDescription};

// Errors
pub use filter::{FilterError, ModelError};

// Configuration
pub use filter::{GaussianFilterConfig, SisConfig, UkfCorrectionConfig, UnscentedParams};

// Traits
pub use filter::{
    FilteringAlgorithm, GaussianCorrection, GaussianPrediction, ParticleSetInitialization, PfCorrection,
    PfPrediction, Resampling,
};
pub use models::{
    AdditiveMeasurementModel, AdditiveStateModel, ExogenousModel, HasTransitionProbability, LikelihoodModel,
    MeasurementModel, StateModel,
};

// Filters and lifecycle
pub use filter::{FilterHandle, GaussianFilter, Sis};

// Components
pub use components::{
    BootstrapCorrection, DrawParticles, InitFixedState, InitSurveillanceAreaGrid, SystematicResampling,
    UkfCorrection, UkfPrediction, UtWeight,
};

// Reference models
pub use models::{
    GaussianLikelihood, LinearMeasurementModel, NonLinearScalarModel, SimulatedLinearSensor, SimulatedStateModel,
};

// Reporters
pub use reporter::{DebugReporter, LoggingReporter, NoOpReporter, StepReporter};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
