//! Core algorithmic components
//!
//! This module provides the building blocks the filters are composed of:
//!
//! - [`sigma_point`] - Unscented transform and its weights
//! - [`ukf_prediction`] / [`ukf_correction`] - Unscented Kalman steps
//! - [`draw_particles`] - Particle propagation through a state model
//! - [`bootstrap_correction`] - Likelihood reweighting of particles
//! - [`resampling`] - Systematic resampling
//! - [`initialization`] - Particle set initialisation

pub mod bootstrap_correction;
pub mod draw_particles;
pub mod initialization;
pub mod resampling;
pub mod sigma_point;
pub mod ukf_correction;
pub mod ukf_prediction;

pub use bootstrap_correction::BootstrapCorrection;
pub use draw_particles::DrawParticles;
pub use initialization::{InitFixedState, InitSurveillanceAreaGrid};
pub use resampling::SystematicResampling;
pub use sigma_point::{sigma_points, unscented_transform, UnscentedOutput, UtWeight};
pub use ukf_correction::UkfCorrection;
pub use ukf_prediction::UkfPrediction;
