//! Configuration loading from JSON

mod helpers;

use bayes_filters::{
    CircularType, FilteringAlgorithm, GaussianFilterConfig, SisConfig, UkfCorrectionConfig, UnscentedParams,
    VectorDescription,
};

#[test]
fn test_sis_config_from_json() {
    let config: SisConfig =
        serde_json::from_str(r#"{"num_particles": 25, "resampling_threshold": 0.5, "max_steps": 3}"#).unwrap();
    assert_eq!(config.num_particles, 25);
    assert_eq!(config.max_steps, Some(3));

    let mut filter = helpers::scalar_sis(1, config.num_particles, config.max_steps);
    assert!(filter.initialization());
    assert!(filter.run_condition(2));
    assert!(!filter.run_condition(3));
}

#[test]
fn test_unbounded_gaussian_config() {
    let config: GaussianFilterConfig = serde_json::from_str(r#"{"max_steps": null}"#).unwrap();
    assert_eq!(config, GaussianFilterConfig::default());
}

#[test]
fn test_correction_config_round_trip() {
    let config = UkfCorrectionConfig {
        params: UnscentedParams::new(0.5, 2.0, 1.0),
        update_weights_online: true,
    };
    let json = serde_json::to_string(&config).unwrap();
    let back: UkfCorrectionConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_vector_description_from_json() {
    let description = VectorDescription::new(2, 1, 0, CircularType::Quaternion);
    let json = serde_json::to_string(&description).unwrap();
    let back: VectorDescription = serde_json::from_str(&json).unwrap();
    assert_eq!(back, description);
    assert_eq!(back.total_size(), 6);
    assert_eq!(back.dof_size(), 5);
}
