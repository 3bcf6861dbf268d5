//! Shared scenario builders for the integration tests
//!
//! The scalar scenario: `x' = 0.5x + 25x/(1+x²)` with unit process noise,
//! observed directly with unit measurement noise, filtered from mean 4 and
//! variance 4 with `(alpha, beta, kappa) = (1, 2, 0)`.

#![allow(dead_code)]

use nalgebra::{DMatrix, DVector};

use bayes_filters::reporter::DebugReporter;
use bayes_filters::{
    BootstrapCorrection, DrawParticles, GaussianFilter, GaussianFilterConfig, GaussianLikelihood, GaussianMixture,
    InitFixedState, NonLinearScalarModel, SimulatedLinearSensor, SimulatedStateModel, Sis, SisConfig,
    SystematicResampling, UkfCorrection, UkfPrediction, UnscentedParams, VectorDescription,
};

pub const SCENARIO_STEPS: usize = 100;
pub const INITIAL_TRUE_STATE: f64 = 0.1;

/// Sensor observing a simulated scalar target for `steps` steps
pub fn scalar_sensor(seed: u64, steps: usize) -> SimulatedLinearSensor {
    let target_model = NonLinearScalarModel::new(1.0, seed).unwrap();
    let target = SimulatedStateModel::new(
        Box::new(target_model),
        DVector::from_vec(vec![INITIAL_TRUE_STATE]),
        steps,
    )
    .unwrap();
    SimulatedLinearSensor::direct(target, 1.0, seed.wrapping_add(1)).unwrap()
}

pub fn scalar_prior() -> GaussianMixture {
    GaussianMixture::from_gaussian(DVector::from_vec(vec![4.0]), DMatrix::from_element(1, 1, 4.0))
}

/// UKF over the scalar scenario, recording every step
pub fn scalar_ukf(seed: u64, max_steps: Option<usize>) -> GaussianFilter<DebugReporter> {
    let params = UnscentedParams::new(1.0, 2.0, 0.0);
    let prediction = UkfPrediction::additive(Box::new(NonLinearScalarModel::new(1.0, seed).unwrap()), params);
    let correction = UkfCorrection::additive(Box::new(scalar_sensor(seed, SCENARIO_STEPS)), params);
    GaussianFilter::with_reporter(
        scalar_prior(),
        Box::new(prediction),
        Box::new(correction),
        GaussianFilterConfig { max_steps },
        DebugReporter::new(),
    )
}

/// Bootstrap particle filter over the scalar scenario
pub fn scalar_sis(seed: u64, num_particles: usize, max_steps: Option<usize>) -> Sis<DebugReporter> {
    let config = SisConfig {
        num_particles,
        max_steps,
        ..SisConfig::default()
    };
    let correction = BootstrapCorrection::new(
        Box::new(scalar_sensor(seed, SCENARIO_STEPS)),
        Box::new(GaussianLikelihood::new()),
    );
    Sis::with_reporter(
        VectorDescription::linear(1),
        config,
        Box::new(InitFixedState::new(DVector::from_vec(vec![INITIAL_TRUE_STATE]))),
        Box::new(DrawParticles::new(Box::new(NonLinearScalarModel::new(1.0, seed).unwrap()))),
        Box::new(correction),
        Box::new(SystematicResampling::new(seed)),
        DebugReporter::new(),
    )
    .unwrap()
}

/// Bit patterns of every value written to `sink`, step by step
pub fn sink_bits(reporter: &DebugReporter, sink: &str) -> Vec<Vec<u64>> {
    reporter
        .sink(sink)
        .into_iter()
        .map(|m| m.iter().map(|v| v.to_bits()).collect())
        .collect()
}
