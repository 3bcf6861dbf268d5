//! Directional statistics
//!
//! Wrap-aware arithmetic for angles and rotation-vector arithmetic for unit
//! quaternions. Quaternions are stored as `[w, x, y, z]`.
//!
//! Conventions:
//! - `directional_add(a, b)` returns angles in `(-π, π]`
//! - `sum_quaternion_rotation_vector(q, r) = exp(r) ⊗ q`
//! - `diff_quaternion(a, b) = log(a ⊗ b⁻¹)`, so `sum(b, diff(a, b)) == a`

use nalgebra::{DMatrix, DVector, Quaternion, UnitQuaternion, Vector3, Vector4};
use std::f64::consts::PI;

const MAX_MEAN_ITERATIONS: usize = 20;
const MEAN_CONVERGENCE_TOLERANCE: f64 = 1e-12;

/// Wrap an angle into `(-π, π]`
#[inline]
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped == -PI {
        PI
    } else {
        wrapped
    }
}

/// Element-wise bounded sum of two angle vectors
pub fn directional_add(a: &DVector<f64>, b: &DVector<f64>) -> DVector<f64> {
    a.zip_map(b, |x, y| wrap_angle(x + y))
}

/// Weighted circular mean
///
/// Each column of `angles` is one sample; the result is
/// `atan2(Σ wᵢ sin θᵢ, Σ wᵢ cos θᵢ)` row by row.
pub fn directional_mean(angles: &DMatrix<f64>, weights: &DVector<f64>) -> DVector<f64> {
    DVector::from_fn(angles.nrows(), |r, _| {
        let (sin_sum, cos_sum) = angles
            .row(r)
            .iter()
            .zip(weights.iter())
            .fold((0.0, 0.0), |(s, c), (theta, w)| {
                (s + w * theta.sin(), c + w * theta.cos())
            });
        sin_sum.atan2(cos_sum)
    })
}

/// Build a unit quaternion from `[w, x, y, z]` storage
#[inline]
pub fn quaternion_from_storage(v: &Vector4<f64>) -> UnitQuaternion<f64> {
    UnitQuaternion::from_quaternion(Quaternion::new(v[0], v[1], v[2], v[3]))
}

/// Store a unit quaternion as `[w, x, y, z]`
#[inline]
pub fn quaternion_to_storage(q: &UnitQuaternion<f64>) -> Vector4<f64> {
    Vector4::new(q.w, q.i, q.j, q.k)
}

/// Compose a quaternion with a rotation vector: `exp(r) ⊗ q`
pub fn sum_quaternion_rotation_vector(q: &Vector4<f64>, rotation_vector: &Vector3<f64>) -> Vector4<f64> {
    let delta = UnitQuaternion::from_scaled_axis(*rotation_vector);
    quaternion_to_storage(&(delta * quaternion_from_storage(q)))
}

/// Rotation vector taking `b` onto `a`: `log(a ⊗ b⁻¹)`
pub fn diff_quaternion(a: &Vector4<f64>, b: &Vector4<f64>) -> Vector3<f64> {
    let qa = quaternion_from_storage(a);
    let qb = quaternion_from_storage(b);
    (qa * qb.inverse()).scaled_axis()
}

/// Weighted mean of unit quaternions in the rotation-vector tangent space
///
/// Starting from the first quaternion, repeatedly averages the rotation
/// vectors of all samples around the current estimate and moves the
/// estimate along the averaged vector. Weights are expected to sum to one
/// and may be negative (as unscented mean weights can be).
pub fn quaternion_mean(quaternions: &[Vector4<f64>], weights: &[f64]) -> Vector4<f64> {
    let Some(first) = quaternions.first() else {
        return Vector4::new(1.0, 0.0, 0.0, 0.0);
    };

    let mut mean = quaternion_from_storage(first);
    let samples: Vec<UnitQuaternion<f64>> = quaternions.iter().map(quaternion_from_storage).collect();

    for _ in 0..MAX_MEAN_ITERATIONS {
        let inverse = mean.inverse();
        let step = samples
            .iter()
            .zip(weights.iter())
            .fold(Vector3::zeros(), |acc, (q, w)| acc + (q * inverse).scaled_axis() * *w);

        mean = UnitQuaternion::from_scaled_axis(step) * mean;

        if step.norm() < MEAN_CONVERGENCE_TOLERANCE {
            break;
        }
    }

    quaternion_to_storage(&mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_wrap_angle_bounds() {
        assert_abs_diff_eq!(wrap_angle(3.0 * PI), PI, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap_angle(-PI), PI, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap_angle(0.5), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap_angle(-2.0 * PI + 0.1), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_directional_add_stays_bounded() {
        let a = DVector::from_vec(vec![3.0, -3.0]);
        let b = DVector::from_vec(vec![0.5, -0.5]);
        let c = directional_add(&a, &b);
        for v in c.iter() {
            assert!(*v > -PI && *v <= PI);
        }
        assert_abs_diff_eq!(c[0], 3.5 - 2.0 * PI, epsilon = 1e-12);
    }

    #[test]
    fn test_directional_mean_across_discontinuity() {
        // Two angles straddling ±π average to π, not to 0
        let angles = DMatrix::from_row_slice(1, 2, &[PI - 0.1, -PI + 0.1]);
        let weights = DVector::from_vec(vec![0.5, 0.5]);
        let mean = directional_mean(&angles, &weights);
        assert_abs_diff_eq!(mean[0].abs(), PI, epsilon = 1e-9);
    }

    #[test]
    fn test_quaternion_sum_and_diff_are_inverse() {
        let q = quaternion_to_storage(&UnitQuaternion::from_euler_angles(0.1, -0.4, 0.7));
        let r = Vector3::new(0.05, 0.2, -0.1);
        let moved = sum_quaternion_rotation_vector(&q, &r);
        let back = diff_quaternion(&moved, &q);
        assert_abs_diff_eq!(back, r, epsilon = 1e-12);
    }

    #[test]
    fn test_quaternion_mean_of_symmetric_perturbations() {
        let center = quaternion_to_storage(&UnitQuaternion::from_euler_angles(0.3, 0.2, -0.5));
        let r = Vector3::new(0.1, 0.0, 0.05);
        let samples = vec![
            center,
            sum_quaternion_rotation_vector(&center, &r),
            sum_quaternion_rotation_vector(&center, &(-r)),
        ];
        let mean = quaternion_mean(&samples, &[0.5, 0.25, 0.25]);
        assert_abs_diff_eq!(diff_quaternion(&mean, &center).norm(), 0.0, epsilon = 1e-9);
    }
}
