//! Core types for the estimation library
//!
//! # Types
//!
//! - [`VectorDescription`] - Linear/circular/noise layout of a vector
//! - [`Data`] - Measurement payload
//! - [`GaussianComponent`] - Single Gaussian component
//! - [`GaussianMixture`] - Weighted Gaussian belief
//! - [`ParticleSet`] - Weighted particle belief (log-domain weights)

pub mod data;
pub mod description;
pub mod gaussian;
pub mod particles;

pub use data::Data;
pub use description::{CircularType, VectorDescription};
pub use gaussian::{GaussianComponent, GaussianMixture};
pub use particles::ParticleSet;
