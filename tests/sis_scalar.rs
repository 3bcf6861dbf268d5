//! End-to-end tests of the bootstrap particle filter on the scalar scenario

mod helpers;

use bayes_filters::reporter::DebugReporter;
use bayes_filters::{FilterHandle, FilteringAlgorithm, Sis, SisConfig};
use helpers::{scalar_sis, sink_bits};

const PARTICLES: usize = 50;
const STEPS: usize = 40;

fn run_manually(mut filter: Sis<DebugReporter>) -> Sis<DebugReporter> {
    assert!(filter.initialization());
    let mut step = 0;
    while filter.run_condition(step) {
        filter.filtering_step();
        step += 1;
    }
    filter
}

#[test]
fn test_particle_shapes_hold_on_every_step() {
    let filter = run_manually(scalar_sis(4, PARTICLES, Some(STEPS)));
    let reporter = filter.reporter();
    assert_eq!(reporter.records().len(), STEPS);

    for record in reporter.records() {
        for sink in ["pred_particles", "cor_particles"] {
            assert_eq!(record.get(sink).unwrap().shape(), (1, PARTICLES));
        }
        for sink in ["pred_weights", "cor_weights"] {
            assert_eq!(record.get(sink).unwrap().shape(), (PARTICLES, 1));
        }
    }
    assert_eq!(filter.corrected().num_particles(), PARTICLES);
    assert_eq!(filter.corrected().log_weights().len(), PARTICLES);
}

#[test]
fn test_reported_weights_are_normalised() {
    let filter = run_manually(scalar_sis(6, PARTICLES, Some(STEPS)));
    for weights in filter.reporter().sink("cor_weights") {
        let total: f64 = weights.iter().map(|w| w.exp()).sum();
        assert!((total - 1.0).abs() < 1e-9, "weights sum to {}", total);
        assert!(weights.iter().all(|w| w.is_finite()));
    }
}

#[test]
fn test_correction_only_reweights() {
    let filter = run_manually(scalar_sis(8, PARTICLES, Some(10)));
    for record in filter.reporter().records() {
        assert_eq!(record.get("pred_particles"), record.get("cor_particles"));
    }
}

#[test]
fn test_resampling_is_triggered() {
    let filter = run_manually(scalar_sis(9, PARTICLES, Some(STEPS)));
    let events = filter.reporter().resampling_events();
    assert!(!events.is_empty());
    for (step, neff) in events {
        assert!(*step < STEPS);
        assert!(*neff < SisConfig::default().resampling_threshold * PARTICLES as f64);
    }
}

#[test]
fn test_threaded_sis_is_reproducible() {
    let manual = run_manually(scalar_sis(12, PARTICLES, Some(STEPS)));

    let mut handle = FilterHandle::new(scalar_sis(12, PARTICLES, Some(STEPS)));
    handle.boot().unwrap();
    handle.run();
    handle.wait().unwrap();
    assert_eq!(handle.filtering_step(), STEPS);
    let threaded = handle.into_inner().unwrap();

    for sink in ["cor_particles", "cor_weights"] {
        assert_eq!(
            sink_bits(manual.reporter(), sink),
            sink_bits(threaded.reporter(), sink),
            "sink {}",
            sink
        );
    }
    assert_eq!(manual.reporter().resampling_events(), threaded.reporter().resampling_events());
}
