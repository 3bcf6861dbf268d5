//! Sigma points and the unscented transform
//!
//! Sigma points are generated around each mixture component from a square
//! root of `c · P`, `c = n + λ`, pushed through a batch map and recomposed
//! into a Gaussian. Circular blocks are perturbed and averaged with wrap-aware
//! arithmetic: angles through bounded addition and the circular mean,
//! quaternions through rotation vectors.

use nalgebra::{DMatrix, DVector, Vector3, Vector4};

use crate::common::directional::{
    diff_quaternion, directional_mean, quaternion_mean, sum_quaternion_rotation_vector, wrap_angle,
};
use crate::common::linalg::psd_sqrt;
use crate::filter::config::UnscentedParams;
use crate::filter::errors::FilterError;
use crate::types::{GaussianMixture, VectorDescription};

/// Sigma-point weights for an `n`-dimensional Gaussian
#[derive(Debug, Clone, PartialEq)]
pub struct UtWeight {
    /// Mean weights, `2n + 1` entries
    pub mean: DVector<f64>,
    /// Covariance weights, `2n + 1` entries
    pub covariance: DVector<f64>,
    /// Scaling `c = n + λ` of the covariance square root
    pub c: f64,
}

impl UtWeight {
    /// Weights for dimension `n`
    ///
    /// `λ = α²(n + κ) − n`, `w₀ᵐ = λ / (n + λ)`,
    /// `w₀ᶜ = w₀ᵐ + 1 − α² + β`, `wᵢ = 1 / (2(n + λ))`.
    pub fn new(n: usize, params: UnscentedParams) -> Self {
        let UnscentedParams { alpha, beta, kappa } = params;
        let nf = n as f64;
        let lambda = alpha * alpha * (nf + kappa) - nf;
        let c = nf + lambda;

        let mut mean = DVector::from_element(2 * n + 1, 0.5 / c);
        mean[0] = lambda / c;

        let mut covariance = mean.clone();
        covariance[0] += 1.0 - alpha * alpha + beta;

        Self { mean, covariance, c }
    }

    /// Weights sized to the intrinsic dimension of `description`
    pub fn from_description(description: &VectorDescription, params: UnscentedParams) -> Self {
        Self::new(description.dof_size(), params)
    }

    /// Dimension `n` the weights were built for
    #[inline]
    pub fn dim(&self) -> usize {
        (self.mean.len() - 1) / 2
    }

    #[inline]
    pub fn num_points(&self) -> usize {
        self.mean.len()
    }
}

/// Result of an unscented transform
#[derive(Debug, Clone)]
pub struct UnscentedOutput {
    /// Output Gaussian per input component (input weights are kept)
    pub mixture: GaussianMixture,
    /// Cross-covariance between the input state (noise part excluded) and
    /// the output, one matrix per component
    pub cross_covariances: Vec<DMatrix<f64>>,
}

/// Sigma points of one mixture component
///
/// # Returns
/// `(points, deltas)`: the `dim × (2n+1)` points in storage layout and the
/// `n × n` square root whose columns are the perturbations.
pub fn sigma_points(
    input: &GaussianMixture,
    component: usize,
    weight: &UtWeight,
) -> Result<(DMatrix<f64>, DMatrix<f64>), FilterError> {
    let n = input.dim_covariance();
    if weight.dim() != n {
        return Err(FilterError::dimension(n, weight.dim(), "sigma-point weights"));
    }

    let sqrt = psd_sqrt(&(input.covariance(component) * weight.c)).ok_or_else(|| {
        FilterError::NotPositiveSemiDefinite {
            context: format!("mixture component {}", component),
        }
    })?;

    let mean = input.mean(component);
    let mut points = DMatrix::zeros(input.dim(), 2 * n + 1);
    points.set_column(0, mean);
    for j in 0..n {
        let delta = sqrt.column(j).into_owned();
        points.set_column(1 + j, &retract(input, mean, &delta));
        points.set_column(1 + n + j, &retract(input, mean, &(-delta)));
    }
    Ok((points, sqrt))
}

/// Move `mean` (storage layout) along `delta` (intrinsic layout)
fn retract(layout: &GaussianMixture, mean: &DVector<f64>, delta: &DVector<f64>) -> DVector<f64> {
    let linear = layout.dim_linear();
    let mut out = mean.clone();

    for r in 0..linear {
        out[r] += delta[r];
    }

    if layout.use_quaternion() {
        for k in 0..layout.dim_circular() {
            let row = linear + 4 * k;
            let q: Vector4<f64> = mean.fixed_rows::<4>(row).into_owned();
            let r: Vector3<f64> = delta.fixed_rows::<3>(linear + 3 * k).into_owned();
            out.fixed_rows_mut::<4>(row)
                .copy_from(&sum_quaternion_rotation_vector(&q, &r));
        }
    } else {
        for k in 0..layout.dim_circular() {
            let r = linear + k;
            out[r] = wrap_angle(mean[r] + delta[r]);
        }
    }

    let noise_storage = linear + layout.dim_circular_storage();
    let noise_dof = linear + layout.dim_circular_dof();
    for k in 0..layout.dim_noise() {
        out[noise_storage + k] += delta[noise_dof + k];
    }

    out
}

/// Weighted mean of mapped points laid out as `description`
fn recompose_mean(points: &DMatrix<f64>, weights: &DVector<f64>, description: &VectorDescription) -> DVector<f64> {
    let mut mean = points * weights;
    let linear = description.linear_size();
    let circular = description.circular_components();
    if circular == 0 {
        return mean;
    }

    if description.is_quaternion() {
        for k in 0..circular {
            let row = linear + 4 * k;
            let quaternions: Vec<Vector4<f64>> = points
                .column_iter()
                .map(|col| col.fixed_rows::<4>(row).into_owned())
                .collect();
            mean.fixed_rows_mut::<4>(row)
                .copy_from(&quaternion_mean(&quaternions, weights.as_slice()));
        }
    } else {
        let angles = points.rows(linear, circular).into_owned();
        mean.rows_mut(linear, circular)
            .copy_from(&directional_mean(&angles, weights));
    }
    mean
}

/// Deviation of `point` from `mean` in intrinsic layout
fn deviation(point: &DVector<f64>, mean: &DVector<f64>, description: &VectorDescription) -> DVector<f64> {
    let linear = description.linear_size();
    let mut out = DVector::zeros(description.dof_size());

    for r in 0..linear {
        out[r] = point[r] - mean[r];
    }
    if description.is_quaternion() {
        for k in 0..description.circular_components() {
            let row = linear + 4 * k;
            let a: Vector4<f64> = point.fixed_rows::<4>(row).into_owned();
            let b: Vector4<f64> = mean.fixed_rows::<4>(row).into_owned();
            out.fixed_rows_mut::<3>(linear + 3 * k)
                .copy_from(&diff_quaternion(&a, &b));
        }
    } else {
        for k in 0..description.circular_components() {
            let r = linear + k;
            out[r] = wrap_angle(point[r] - mean[r]);
        }
    }
    let noise_storage = linear + description.circular_size();
    let noise_dof = linear + description.circular_dof();
    for k in 0..description.noise_size() {
        out[noise_dof + k] = point[noise_storage + k] - mean[noise_storage + k];
    }
    out
}

/// Push a Gaussian mixture through `map` with the unscented transform
///
/// # Arguments
/// * `input` - Mixture to transform, possibly noise-augmented
/// * `weight` - Weights sized to `input.dim_covariance()`
/// * `output` - Layout of the vectors returned by `map`
/// * `additive_noise` - Covariance added to every output covariance
/// * `map` - Batch map, one sigma point per column
///
/// # Returns
/// The output mixture and the input/output cross-covariances, or an error
/// when the weights do not fit the input, a covariance has no square root
/// or `map` misbehaves.
pub fn unscented_transform<F>(
    input: &GaussianMixture,
    weight: &UtWeight,
    output: &VectorDescription,
    additive_noise: Option<&DMatrix<f64>>,
    mut map: F,
) -> Result<UnscentedOutput, FilterError>
where
    F: FnMut(&DMatrix<f64>) -> Result<DMatrix<f64>, FilterError>,
{
    let output = output.noiseless();
    let out_dof = output.dof_size();
    if let Some(noise) = additive_noise {
        if noise.nrows() != out_dof {
            return Err(FilterError::dimension(out_dof, noise.nrows(), "additive noise covariance"));
        }
    }

    let mut mixture = GaussianMixture::from_description(input.num_components(), &output);
    let mut cross_covariances = Vec::with_capacity(input.num_components());
    let state_dof = input.dim_covariance() - input.dim_noise();

    for i in 0..input.num_components() {
        let (points, sqrt) = sigma_points(input, i, weight)?;
        let mapped = map(&points)?;
        if mapped.shape() != (output.total_size(), points.ncols()) {
            return Err(FilterError::dimension(
                output.total_size() * points.ncols(),
                mapped.nrows() * mapped.ncols(),
                "mapped sigma points",
            ));
        }

        let mean = recompose_mean(&mapped, &weight.mean, &output);

        let n = weight.dim();
        let mut covariance = DMatrix::zeros(out_dof, out_dof);
        let mut cross = DMatrix::zeros(state_dof, out_dof);
        for (k, col) in mapped.column_iter().enumerate() {
            let dy = deviation(&col.into_owned(), &mean, &output);
            let wc = weight.covariance[k];
            covariance += &dy * dy.transpose() * wc;

            if k > 0 {
                let sign = if k <= n { 1.0 } else { -1.0 };
                let dx = sqrt.view((0, (k - 1) % n), (state_dof, 1)) * sign;
                cross += dx * dy.transpose() * wc;
            }
        }
        if let Some(noise) = additive_noise {
            covariance += noise;
        }

        mixture.set_weight(i, input.weight(i));
        mixture.set_moments(i, mean, covariance);
        cross_covariances.push(cross);
    }

    Ok(UnscentedOutput {
        mixture,
        cross_covariances,
    })
}
