//! Decorated models plugged into the unscented steps

use approx::assert_abs_diff_eq;
use nalgebra::{DMatrix, DVector};

use bayes_filters::models::{Forward, InputInjection, MeasurementModelDecorator, NoiseInflation, StateModelDecorator};
use bayes_filters::{
    Data, GaussianCorrection, GaussianMixture, GaussianPrediction, LinearMeasurementModel, MeasurementModel,
    NonLinearScalarModel, UkfCorrection, UkfPrediction, UnscentedParams,
};

fn unit_prior() -> GaussianMixture {
    GaussianMixture::from_gaussian(DVector::zeros(1), DMatrix::identity(1, 1))
}

#[test]
fn test_noise_inflation_weakens_correction() {
    let mut sensor = MeasurementModelDecorator::new(LinearMeasurementModel::scalar(1.0, 1).unwrap(), NoiseInflation::new(4.0));
    assert!(sensor.freeze(&Data::Scalar(1.0)));
    let mut inflated = UkfCorrection::additive(Box::new(sensor), UnscentedParams::default());

    let mut plain_sensor = LinearMeasurementModel::scalar(1.0, 1).unwrap();
    assert!(plain_sensor.freeze(&Data::Scalar(1.0)));
    let mut plain = UkfCorrection::additive(Box::new(plain_sensor), UnscentedParams::default());

    // Py = 1 + 4, K = 1/5
    let cor = inflated.correct(&unit_prior());
    assert_abs_diff_eq!(cor.mean(0)[0], 0.2, epsilon = 1e-12);
    assert_abs_diff_eq!(cor.covariance(0)[(0, 0)], 0.8, epsilon = 1e-12);

    // Py = 1 + 1, K = 1/2
    let cor = plain.correct(&unit_prior());
    assert_abs_diff_eq!(cor.mean(0)[0], 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(cor.covariance(0)[(0, 0)], 0.5, epsilon = 1e-12);
}

#[test]
fn test_forward_decoration_predicts_like_inner_model() {
    let params = UnscentedParams::default();
    let decorated = StateModelDecorator::new(NonLinearScalarModel::new(1.0, 1).unwrap(), Forward);
    let mut through_decorator = UkfPrediction::additive(Box::new(decorated), params);
    let mut direct = UkfPrediction::additive(Box::new(NonLinearScalarModel::new(1.0, 1).unwrap()), params);

    let prior = GaussianMixture::from_gaussian(DVector::from_vec(vec![4.0]), DMatrix::from_element(1, 1, 4.0));
    assert_eq!(through_decorator.predict(&prior), direct.predict(&prior));
}

#[test]
fn test_input_injection_shifts_prediction_input() {
    let params = UnscentedParams::default();
    let decorated = StateModelDecorator::new(
        NonLinearScalarModel::new(1.0, 1).unwrap(),
        InputInjection::new(DVector::from_vec(vec![1.0])),
    );
    let mut shifted = UkfPrediction::additive(Box::new(decorated), params);
    let mut direct = UkfPrediction::additive(Box::new(NonLinearScalarModel::new(1.0, 1).unwrap()), params);

    let prior = GaussianMixture::from_gaussian(DVector::from_vec(vec![1.0]), DMatrix::from_element(1, 1, 0.5));
    let moved = GaussianMixture::from_gaussian(DVector::from_vec(vec![2.0]), DMatrix::from_element(1, 1, 0.5));
    let a = shifted.predict(&prior);
    let b = direct.predict(&moved);
    assert_abs_diff_eq!(a.mean(0)[0], b.mean(0)[0], epsilon = 1e-12);
    assert_abs_diff_eq!(a.covariance(0)[(0, 0)], b.covariance(0)[(0, 0)], epsilon = 1e-12);
}
