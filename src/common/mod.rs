//! Low-level numerical utilities
//!
//! - [`linalg`] - Gaussian densities, PSD square roots, log-domain helpers
//! - [`directional`] - Angle and quaternion arithmetic
//! - [`rng`] - Seedable random source owned by models

pub mod directional;
pub mod linalg;
pub mod rng;

pub use rng::{SimpleRng, DEFAULT_SEED};
