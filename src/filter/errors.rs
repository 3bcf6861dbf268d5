//! Error types for models, components and filters
//!
//! Recoverable conditions inside a filtering step (missing measurement,
//! degenerate covariance) are not errors: the step degrades to a no-op.
//! The types here cover construction, capability queries and the thread
//! lifecycle.

use thiserror::Error;

/// Errors raised by state, measurement and likelihood models
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// The model does not provide the requested capability
    #[error("Operation not supported by this model: {operation}")]
    Unsupported {
        /// Name of the missing operation (e.g. "noise_covariance_matrix")
        operation: &'static str,
    },

    /// A [`Data`](crate::types::Data) payload had an unexpected shape
    #[error("Data cast failed: expected {expected}, found {found}")]
    DataCast {
        expected: &'static str,
        found: &'static str,
    },

    /// Model parameters are malformed
    #[error("Model configuration error: {description}")]
    Configuration {
        /// Description of the configuration issue
        description: String,
    },

    /// Input to a model has the wrong size
    #[error("Dimension mismatch for {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
        context: String,
    },
}

impl ModelError {
    pub(crate) fn unsupported(operation: &'static str) -> Self {
        ModelError::Unsupported { operation }
    }
}

/// Errors that can occur while building or driving a filter
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// Matrix inversion failed (singular matrix)
    #[error("Matrix inversion failed: {context}")]
    SingularMatrix {
        /// Description of which matrix failed
        context: String,
    },

    /// Dimension mismatch between expected and actual
    #[error("Dimension mismatch for {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// What was expected
        expected: usize,
        /// What was received
        actual: usize,
        /// Context (e.g., "state dimension", "measurement dimension")
        context: String,
    },

    /// A covariance has no real square root
    #[error("Covariance is not positive semi-definite: {context}")]
    NotPositiveSemiDefinite {
        /// Which covariance failed
        context: String,
    },

    /// Configuration error
    #[error("Configuration error: {description}")]
    Configuration {
        /// Description of the configuration issue
        description: String,
    },

    /// Error reported by a model
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// The background filtering thread could not be spawned
    #[error("Failed to spawn filtering thread: {reason}")]
    ThreadSpawn { reason: String },

    /// The background filtering thread panicked
    #[error("Filtering thread panicked")]
    ThreadJoin,

    /// `boot()` called while a filtering thread is already attached
    #[error("Filter is already booted")]
    AlreadyBooted,
}

impl FilterError {
    pub(crate) fn configuration(description: impl Into<String>) -> Self {
        FilterError::Configuration {
            description: description.into(),
        }
    }

    pub(crate) fn dimension(expected: usize, actual: usize, context: impl Into<String>) -> Self {
        FilterError::DimensionMismatch {
            expected,
            actual,
            context: context.into(),
        }
    }
}
