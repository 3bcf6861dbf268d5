//! Gaussian filter
//!
//! Recursion over a [`GaussianMixture`] belief:
//!
//! ```text
//! initialization:  corrected <- initial belief
//! filtering_step:  predicted <- prediction.predict(corrected)
//!                  correction.freeze_measurements()
//!                  corrected <- correction.correct(predicted)
//!                  reporter.on_gaussian_step(...)
//! ```
//!
//! With [`UkfPrediction`](crate::components::UkfPrediction) and
//! [`UkfCorrection`](crate::components::UkfCorrection) this is an unscented
//! Kalman filter.

use log::debug;

use crate::filter::config::GaussianFilterConfig;
use crate::filter::traits::{FilteringAlgorithm, GaussianCorrection, GaussianPrediction};
use crate::reporter::{NoOpReporter, StepReporter};
use crate::types::{Data, GaussianMixture};

/// Recursive Gaussian filter
pub struct GaussianFilter<R: StepReporter = NoOpReporter> {
    initial: GaussianMixture,
    predicted: GaussianMixture,
    corrected: GaussianMixture,
    prediction: Box<dyn GaussianPrediction>,
    correction: Box<dyn GaussianCorrection>,
    config: GaussianFilterConfig,
    step: usize,
    reporter: R,
}

impl GaussianFilter<NoOpReporter> {
    pub fn new(
        initial: GaussianMixture,
        prediction: Box<dyn GaussianPrediction>,
        correction: Box<dyn GaussianCorrection>,
        config: GaussianFilterConfig,
    ) -> Self {
        Self::with_reporter(initial, prediction, correction, config, NoOpReporter)
    }
}

impl<R: StepReporter> GaussianFilter<R> {
    pub fn with_reporter(
        initial: GaussianMixture,
        prediction: Box<dyn GaussianPrediction>,
        correction: Box<dyn GaussianCorrection>,
        config: GaussianFilterConfig,
        reporter: R,
    ) -> Self {
        Self {
            predicted: initial.clone(),
            corrected: initial.clone(),
            initial,
            prediction,
            correction,
            config,
            step: 0,
            reporter,
        }
    }

    #[inline]
    pub fn predicted(&self) -> &GaussianMixture {
        &self.predicted
    }

    #[inline]
    pub fn corrected(&self) -> &GaussianMixture {
        &self.corrected
    }

    pub fn prediction_mut(&mut self) -> &mut dyn GaussianPrediction {
        self.prediction.as_mut()
    }

    pub fn correction_mut(&mut self) -> &mut dyn GaussianCorrection {
        self.correction.as_mut()
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn reporter_mut(&mut self) -> &mut R {
        &mut self.reporter
    }

    /// Disable or re-enable part of the prediction (`"prediction"`,
    /// `"state"`, `"exogenous"`) or the correction (`"correction"`)
    pub fn skip(&mut self, what: &str, status: bool) -> bool {
        if what == "correction" {
            self.correction.skip(status);
            return true;
        }
        self.prediction.skip(what, status)
    }
}

impl<R: StepReporter + 'static> FilteringAlgorithm for GaussianFilter<R> {
    fn initialization(&mut self) -> bool {
        self.corrected = self.initial.clone();
        self.predicted = self.initial.clone();
        self.step = 0;
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

        self.reporter.on_gaussian_step(self.step, &self.predicted, &self.corrected);
        self.step += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{UkfCorrection, UkfPrediction};
    use crate::filter::config::UnscentedParams;
    use crate::models::{LinearMeasurementModel, NonLinearScalarModel};
    use crate::reporter::DebugReporter;
    use nalgebra::{DMatrix, DVector};

    fn filter(max_steps: Option<usize>) -> GaussianFilter<DebugReporter> {
        let prediction = UkfPrediction::additive(Box::new(NonLinearScalarModel::new(1.0, 1).unwrap()), UnscentedParams::default());
        // Never frozen with data: every correction is a no-op
        let correction = UkfCorrection::additive(Box::new(LinearMeasurementModel::scalar(1.0, 1).unwrap()), UnscentedParams::default());
        let initial = GaussianMixture::from_gaussian(DVector::from_vec(vec![4.0]), DMatrix::from_element(1, 1, 4.0));
        GaussianFilter::with_reporter(
            initial,
            Box::new(prediction),
            Box::new(correction),
            GaussianFilterConfig { max_steps },
            DebugReporter::new(),
        )
    }

    #[test]
    fn test_step_without_measurement_keeps_prediction() {
        let mut f = filter(Some(3));
        assert!(f.initialization());
        f.filtering_step();
        assert_eq!(f.corrected(), f.predicted());
        assert_eq!(f.reporter().records().len(), 1);
        assert_eq!(f.reporter().records()[0].step, 0);
    }

    #[test]
    fn test_run_condition_honours_step_budget() {
        let f = filter(Some(2));
        assert!(f.run_condition(1));
        assert!(!f.run_condition(2));
        assert!(filter(None).run_condition(usize::MAX - 1));
    }

    #[test]
    fn test_initialization_restores_initial_belief() {
        let mut f = filter(None);
        f.initialization();
        let initial = f.corrected().clone();
        f.filtering_step();
        f.filtering_step();
        assert_ne!(f.corrected(), &initial);
        f.initialization();
        assert_eq!(f.corrected(), &initial);
    }

    #[test]
    fn test_step_accessors() {
        let mut f = filter(None);
        f.prediction_mut().skip("state", true);
        f.correction_mut().skip(true);
        f.initialization();
        f.filtering_step();
        assert_eq!(f.corrected(), f.predicted());

        f.reporter_mut().clear();
        assert!(f.reporter().records().is_empty());
    }

    #[test]
    fn test_skip_everything_is_identity() {
        let mut f = filter(None);
        assert!(f.skip("prediction", true));
        assert!(f.skip("correction", true));
        assert!(!f.skip("nothing", true));
        f.initialization();
        let initial = f.corrected().clone();
        f.filtering_step();
        assert_eq!(f.corrected(), &initial);
    }
}
