//! Filter implementations
//!
//! This module provides the step traits, the filters built on them and the
//! lifecycle that drives a filter on its own thread:
//!
//! - [`GaussianPrediction`] / [`GaussianCorrection`] - Gaussian belief steps
//! - [`PfPrediction`] / [`PfCorrection`] - Particle belief steps
//! - [`FilteringAlgorithm`] - Contract driven by [`FilterHandle`]
//!
//! # Filter Types
//!
//! - [`GaussianFilter`] - Prediction/correction over a Gaussian mixture (UKF
//!   with the unscented components)
//! - [`Sis`] - Sequential importance sampling with resampling

pub mod config;
pub mod errors;
pub mod gaussian;
pub mod lifecycle;
pub mod sis;
pub mod traits;

pub use config::{GaussianFilterConfig, SisConfig, UkfCorrectionConfig, UnscentedParams};
pub use errors::{FilterError, ModelError};
pub use gaussian::GaussianFilter;
pub use lifecycle::FilterHandle;
pub use sis::Sis;
pub use traits::{
    FilteringAlgorithm, GaussianCorrection, GaussianPrediction, ParticleSetInitialization, PfCorrection,
    PfPrediction, Resampling, SkipFlags,
};
