//! Sequential importance sampling particle filter
//!
//! ```text
//! initialization:  initializer fills the particles, log-weights = -ln N
//! filtering_step:  predicted <- prediction.predict(corrected)
//!                  correction.freeze_measurements()
//!                  corrected <- correction.correct(predicted)
//!                  normalise log-weights
//!                  reporter.on_particle_step(...)
//!                  resample when neff < threshold · N
//! ```

use log::debug;

use crate::filter::config::SisConfig;
use crate::filter::errors::FilterError;
use crate::filter::traits::{FilteringAlgorithm, ParticleSetInitialization, PfCorrection, PfPrediction, Resampling};
use crate::reporter::{NoOpReporter, StepReporter};
use crate::types::{Data, ParticleSet, VectorDescription};

/// SIS particle filter with threshold-triggered resampling
pub struct Sis<R: StepReporter = NoOpReporter> {
    predicted: ParticleSet,
    corrected: ParticleSet,
    initializer: Box<dyn ParticleSetInitialization>,
    prediction: Box<dyn PfPrediction>,
    correction: Box<dyn PfCorrection>,
    resampling: Box<dyn Resampling>,
    config: SisConfig,
    step: usize,
    reporter: R,
}

impl Sis<NoOpReporter> {
    pub fn new(
        description: VectorDescription,
        config: SisConfig,
        initializer: Box<dyn ParticleSetInitialization>,
        prediction: Box<dyn PfPrediction>,
        correction: Box<dyn PfCorrection>,
        resampling: Box<dyn Resampling>,
    ) -> Result<Self, FilterError> {
        Self::with_reporter(
            description,
            config,
            initializer,
            prediction,
            correction,
            resampling,
            NoOpReporter,
        )
    }
}

impl<R: StepReporter> Sis<R> {
    /// # Errors
    /// Configuration error for zero particles or a threshold outside `[0, 1]`.
    pub fn with_reporter(
        description: VectorDescription,
        config: SisConfig,
        initializer: Box<dyn ParticleSetInitialization>,
        prediction: Box<dyn PfPrediction>,
        correction: Box<dyn PfCorrection>,
        resampling: Box<dyn Resampling>,
        reporter: R,
    ) -> Result<Self, FilterError> {
        if !(0.0..=1.0).contains(&config.resampling_threshold) {
            return Err(FilterError::configuration(format!(
                "resampling threshold must lie in [0, 1], got {}",
                config.resampling_threshold
            )));
        }
        let particles = ParticleSet::new(config.num_particles, description)?;
        Ok(Self {
            predicted: particles.clone(),
            corrected: particles,
            initializer,
            prediction,
            correction,
            resampling,
            config,
            step: 0,
            reporter,
        })
    }

    #[inline]
    pub fn predicted(&self) -> &ParticleSet {
        &self.predicted
    }

    #[inline]
    pub fn corrected(&self) -> &ParticleSet {
        &self.corrected
    }

    #[inline]
    pub fn config(&self) -> &SisConfig {
        &self.config
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Disable or re-enable the prediction (`"prediction"`, `"state"`) or the
    /// correction (`"correction"`)
    pub fn skip(&mut self, what: &str, status: bool) -> bool {
        if what == "correction" {
            self.correction.skip(status);
            return true;
        }
        self.prediction.skip(what, status)
    }

    fn resampling_needed(&self) -> bool {
        let neff = self.resampling.neff(&self.corrected);
        neff < self.config.resampling_threshold * self.config.num_particles as f64
    }
}

impl<R: StepReporter + 'static> FilteringAlgorithm for Sis<R> {
    fn initialization(&mut self) -> bool {
        self.step = 0;
        if !self.initializer.initialize(&mut self.corrected) {
            return false;
        }
        self.corrected.set_uniform_log_weights();
        self.predicted = self.corrected.clone();
        true
    }

    fn run_condition(&self, step: usize) -> bool {
        self.config.max_steps.map_or(true, |max| step < max)
    }

    fn filtering_step(&mut self) {
        self.predicted = self.prediction.predict(&self.corrected);

        if !self.correction.freeze_measurements(&Data::Empty) {
            debug!("No new measurement at step {}", self.step);
        }
        self.corrected = self.correction.correct(&self.predicted);
        self.corrected.normalise();

        self.reporter.on_particle_step(self.step, &self.predicted, &self.corrected);

        if self.resampling_needed() {
            let neff = self.resampling.neff(&self.corrected);
            self.corrected = self.resampling.resample(&self.corrected);
            self.reporter.on_resampling(self.step, neff);
        }
        self.step += 1;
    }
}
