//! Observability for filter execution.
//!
//! This module provides the [`StepReporter`] trait for debugging and research
//! instrumentation. After each filtering step a filter hands its predicted
//! and corrected belief to the reporter as a fixed set of named matrices
//! (one [`StepRecord`]). Reporters only observe: nothing they do feeds back
//! into the estimate.
//!
//! # Zero-Cost Abstraction
//!
//! The default [`NoOpReporter`] compiles to zero overhead - all callback
//! methods are empty and will be optimized away by the compiler.
//!
//! # Sinks
//!
//! Gaussian filters report `pred_mean`, `pred_cov`, `cor_mean`, `cor_cov`
//! (means stacked column-wise per component, covariances stacked
//! side by side). Particle filters report `pred_particles`, `pred_weights`,
//! `cor_particles`, `cor_weights`.
//!
//! # Example
//!
//! ```
//! use bayes_filters::reporter::{DebugReporter, StepReporter};
//! use bayes_filters::types::GaussianMixture;
//! use nalgebra::{DMatrix, DVector};
//!
//! let mut reporter = DebugReporter::new();
//! let belief = GaussianMixture::from_gaussian(DVector::zeros(1), DMatrix::identity(1, 1));
//! reporter.on_gaussian_step(0, &belief, &belief);
//!
//! assert_eq!(reporter.records().len(), 1);
//! assert_eq!(reporter.sink("cor_mean").len(), 1);
//! ```

use nalgebra::{DMatrix, DVector};

use crate::types::{GaussianMixture, ParticleSet};

// ============================================================================
// StepRecord
// ============================================================================

/// Named matrices emitted after one filtering step
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    /// Index of the step within the current run
    pub step: usize,
    /// `(sink name, value)` pairs, always in the same order for a filter
    pub sinks: Vec<(&'static str, DMatrix<f64>)>,
}

impl StepRecord {
    /// Record of a Gaussian filter step
    pub fn gaussian(step: usize, predicted: &GaussianMixture, corrected: &GaussianMixture) -> Self {
        Self {
            step,
            sinks: vec![
                ("pred_mean", predicted.means()),
                ("pred_cov", stacked_covariances(predicted)),
                ("cor_mean", corrected.means()),
                ("cor_cov", stacked_covariances(corrected)),
            ],
        }
    }

    /// Record of a particle filter step
    pub fn particles(step: usize, predicted: &ParticleSet, corrected: &ParticleSet) -> Self {
        Self {
            step,
            sinks: vec![
                ("pred_particles", predicted.state().clone()),
                ("pred_weights", column(predicted.log_weights())),
                ("cor_particles", corrected.state().clone()),
                ("cor_weights", column(corrected.log_weights())),
            ],
        }
    }

    /// Value of sink `name`, if present
    pub fn get(&self, name: &str) -> Option<&DMatrix<f64>> {
        self.sinks.iter().find(|(n, _)| *n == name).map(|(_, m)| m)
    }
}

fn column(v: &DVector<f64>) -> DMatrix<f64> {
    DMatrix::from_column_slice(v.len(), 1, v.as_slice())
}

/// Covariances of all components side by side
fn stacked_covariances(mixture: &GaussianMixture) -> DMatrix<f64> {
    let n = mixture.dim_covariance();
    let mut out = DMatrix::zeros(n, n * mixture.num_components());
    for i in 0..mixture.num_components() {
        out.columns_mut(i * n, n).copy_from(mixture.covariance(i));
    }
    out
}

// ============================================================================
// StepReporter Trait
// ============================================================================

/// Observability trait for filter step execution.
///
/// All methods have default empty implementations, so you only need
/// to override the events you care about.
///
/// # Thread Safety
///
/// Filters run on their own thread, so reporters must be `Send`. Callbacks
/// take `&mut self`; no further synchronisation is required.
///
/// # Example
///
/// ```
/// use bayes_filters::reporter::StepReporter;
/// use bayes_filters::types::GaussianMixture;
///
/// struct CountingReporter {
///     steps: usize,
/// }
///
/// impl StepReporter for CountingReporter {
///     fn on_gaussian_step(&mut self, _step: usize, _pred: &GaussianMixture, _cor: &GaussianMixture) {
///         self.steps += 1;
///     }
/// }
/// ```
pub trait StepReporter: Send {
    /// Called after the correction of a Gaussian filter step.
    fn on_gaussian_step(&mut self, _step: usize, _predicted: &GaussianMixture, _corrected: &GaussianMixture) {}

    /// Called after the correction (and normalisation) of a particle filter
    /// step, before any resampling.
    fn on_particle_step(&mut self, _step: usize, _predicted: &ParticleSet, _corrected: &ParticleSet) {}

    /// Called when a particle filter resamples.
    fn on_resampling(&mut self, _step: usize, _neff: f64) {}
}

// ============================================================================
// NoOpReporter
// ============================================================================

/// Zero-cost reporter that does nothing.
///
/// This is the default reporter used when no observability is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpReporter;

impl NoOpReporter {
    /// Create a new no-op reporter.
    pub fn new() -> Self {
        Self
    }
}

impl StepReporter for NoOpReporter {
    // All methods use default empty implementations
}

// ============================================================================
// DebugReporter
// ============================================================================

/// Reporter that captures all events for debugging.
///
/// # Memory Usage
///
/// Every step clones the reported beliefs. Long runs with many particles
/// can consume significant memory.
#[derive(Debug, Clone, Default)]
pub struct DebugReporter {
    /// Captured step records
    records: Vec<StepRecord>,

    /// Captured resampling events (step, neff)
    resamplings: Vec<(usize, f64)>,
}

impl DebugReporter {
    /// Create a new debug reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all captured events.
    pub fn clear(&mut self) {
        self.records.clear();
        self.resamplings.clear();
    }

    /// Get captured step records.
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// Get captured resampling events.
    pub fn resampling_events(&self) -> &[(usize, f64)] {
        &self.resamplings
    }

    /// Every value written to sink `name`, in step order.
    pub fn sink(&self, name: &str) -> Vec<&DMatrix<f64>> {
        self.records.iter().filter_map(|r| r.get(name)).collect()
    }
}

impl StepReporter for DebugReporter {
    fn on_gaussian_step(&mut self, step: usize, predicted: &GaussianMixture, corrected: &GaussianMixture) {
        self.records.push(StepRecord::gaussian(step, predicted, corrected));
    }

    fn on_particle_step(&mut self, step: usize, predicted: &ParticleSet, corrected: &ParticleSet) {
        self.records.push(StepRecord::particles(step, predicted, corrected));
    }

    fn on_resampling(&mut self, step: usize, neff: f64) {
        self.resamplings.push((step, neff));
    }
}

// ============================================================================
// LoggingReporter
// ============================================================================

/// Reporter that logs events using the log crate.
///
/// # Log Levels
///
/// - step summaries: TRACE
/// - resampling: DEBUG
/// - full matrices (verbose only): TRACE
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingReporter {
    /// Whether to include the reported matrices in log messages
    verbose: bool,
}

impl LoggingReporter {
    /// Create a new logging reporter.
    pub fn new() -> Self {
        Self { verbose: false }
    }

    /// Create a verbose logging reporter that includes the matrices.
    pub fn verbose() -> Self {
        Self { verbose: true }
    }

    fn log_record(&self, record: &StepRecord) {
        if !self.verbose {
            return;
        }
        for (name, value) in &record.sinks {
            log::trace!("  {}: {}", name, value.transpose());
        }
    }
}

impl StepReporter for LoggingReporter {
    fn on_gaussian_step(&mut self, step: usize, predicted: &GaussianMixture, corrected: &GaussianMixture) {
        log::trace!(
            "Gaussian step {}: {} components, predicted mean {}, corrected mean {}",
            step,
            corrected.num_components(),
            predicted.weighted_mean().transpose(),
            corrected.weighted_mean().transpose()
        );
        self.log_record(&StepRecord::gaussian(step, predicted, corrected));
    }

    fn on_particle_step(&mut self, step: usize, predicted: &ParticleSet, corrected: &ParticleSet) {
        log::trace!(
            "Particle step {}: {} particles, neff {:.2}, corrected mean {}",
            step,
            corrected.num_particles(),
            corrected.neff(),
            corrected.weighted_mean().transpose()
        );
        self.log_record(&StepRecord::particles(step, predicted, corrected));
    }

    fn on_resampling(&mut self, step: usize, neff: f64) {
        log::debug!("Resampling at step {} (neff {:.2})", step, neff);
    }
}
