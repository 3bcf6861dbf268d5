//! Gaussian mixture beliefs
//!
//! A [`GaussianMixture`] is an ordered set of weighted Gaussians sharing one
//! layout: a linear prefix followed by a circular suffix (one angle, or one
//! `[w, x, y, z]` quaternion, per circular component) and, after noise
//! augmentation, trailing noise entries.
//!
//! Means use the storage layout, covariances the intrinsic one: a
//! quaternion occupies 4 mean entries but only 3 covariance rows.

use nalgebra::{DMatrix, DVector, Vector4};
use smallvec::SmallVec;

use crate::common::directional::{directional_mean, quaternion_mean};
use crate::common::linalg::block_diagonal;
use crate::types::description::{CircularType, VectorDescription};

/// Gaussian component with runtime dimensions
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianComponent {
    /// Component weight (mixture weights sum to 1)
    pub weight: f64,
    /// Mean vector (storage layout)
    pub mean: DVector<f64>,
    /// Covariance matrix (intrinsic layout)
    pub covariance: DMatrix<f64>,
}

impl GaussianComponent {
    /// Create a new Gaussian component
    pub fn new(weight: f64, mean: DVector<f64>, covariance: DMatrix<f64>) -> Self {
        Self {
            weight,
            mean,
            covariance,
        }
    }

    /// Create a zero-weighted component (for initialization)
    pub fn zero(mean_dim: usize, cov_dim: usize) -> Self {
        Self {
            weight: 0.0,
            mean: DVector::zeros(mean_dim),
            covariance: DMatrix::zeros(cov_dim, cov_dim),
        }
    }
}

/// Weighted set of Gaussians over a linear/circular state
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianMixture {
    /// Mixture components (SmallVec avoids heap for typical 1-4 components)
    components: SmallVec<[GaussianComponent; 4]>,
    dim_linear: usize,
    dim_circular: usize,
    dim_noise: usize,
    use_quaternion: bool,
}

impl GaussianMixture {
    /// Mixture of `components` zero-mean, zero-covariance Gaussians with uniform weights
    pub fn new(components: usize, dim_linear: usize, dim_circular: usize, use_quaternion: bool) -> Self {
        let mut mixture = Self {
            components: SmallVec::new(),
            dim_linear,
            dim_circular,
            dim_noise: 0,
            use_quaternion,
        };
        let (mean_dim, cov_dim) = (mixture.dim(), mixture.dim_covariance());
        let weight = if components > 0 { 1.0 / components as f64 } else { 0.0 };
        mixture.components.extend((0..components).map(|_| {
            let mut c = GaussianComponent::zero(mean_dim, cov_dim);
            c.weight = weight;
            c
        }));
        mixture
    }

    /// Mixture shaped after a vector description (noise entries are ignored)
    pub fn from_description(components: usize, description: &VectorDescription) -> Self {
        Self::new(
            components,
            description.linear_components(),
            description.circular_components(),
            description.is_quaternion(),
        )
    }

    /// Single linear Gaussian
    pub fn from_gaussian(mean: DVector<f64>, covariance: DMatrix<f64>) -> Self {
        let dim_linear = mean.len();
        let mut components = SmallVec::new();
        components.push(GaussianComponent::new(1.0, mean, covariance));
        Self {
            components,
            dim_linear,
            dim_circular: 0,
            dim_noise: 0,
            use_quaternion: false,
        }
    }

    #[inline]
    pub fn num_components(&self) -> usize {
        self.components.len()
    }

    #[inline]
    pub fn dim_linear(&self) -> usize {
        self.dim_linear
    }

    /// Number of circular components (angles or quaternions)
    #[inline]
    pub fn dim_circular(&self) -> usize {
        self.dim_circular
    }

    #[inline]
    pub fn dim_noise(&self) -> usize {
        self.dim_noise
    }

    #[inline]
    pub fn use_quaternion(&self) -> bool {
        self.use_quaternion
    }

    /// Stored size of the circular block
    #[inline]
    pub fn dim_circular_storage(&self) -> usize {
        if self.use_quaternion {
            4 * self.dim_circular
        } else {
            self.dim_circular
        }
    }

    /// Intrinsic size of the circular block
    #[inline]
    pub fn dim_circular_dof(&self) -> usize {
        if self.use_quaternion {
            3 * self.dim_circular
        } else {
            self.dim_circular
        }
    }

    /// Size of each mean vector
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim_linear + self.dim_circular_storage() + self.dim_noise
    }

    /// Size of each covariance matrix
    #[inline]
    pub fn dim_covariance(&self) -> usize {
        self.dim_linear + self.dim_circular_dof() + self.dim_noise
    }

    /// Description of the state part (noise dropped)
    pub fn description(&self) -> VectorDescription {
        let circular_type = if self.use_quaternion {
            CircularType::Quaternion
        } else {
            CircularType::Euler
        };
        VectorDescription::new(self.dim_linear, self.dim_circular, self.dim_noise, circular_type)
    }

    pub fn components(&self) -> &[GaussianComponent] {
        &self.components
    }

    pub fn component(&self, i: usize) -> &GaussianComponent {
        &self.components[i]
    }

    #[inline]
    pub fn mean(&self, i: usize) -> &DVector<f64> {
        &self.components[i].mean
    }

    #[inline]
    pub fn covariance(&self, i: usize) -> &DMatrix<f64> {
        &self.components[i].covariance
    }

    #[inline]
    pub fn weight(&self, i: usize) -> f64 {
        self.components[i].weight
    }

    pub fn set_weight(&mut self, i: usize, weight: f64) {
        self.components[i].weight = weight;
    }

    /// Replace the mean and covariance of component `i`
    ///
    /// # Panics
    /// If the shapes disagree with the mixture layout.
    pub fn set_moments(&mut self, i: usize, mean: DVector<f64>, covariance: DMatrix<f64>) {
        assert_eq!(mean.len(), self.dim(), "mean size mismatch");
        assert_eq!(
            covariance.shape(),
            (self.dim_covariance(), self.dim_covariance()),
            "covariance size mismatch"
        );
        let c = &mut self.components[i];
        c.mean = mean;
        c.covariance = covariance;
    }

    /// All means stacked column-wise, one column per component
    pub fn means(&self) -> DMatrix<f64> {
        let mut out = DMatrix::zeros(self.dim(), self.num_components());
        for (i, c) in self.components.iter().enumerate() {
            out.set_column(i, &c.mean);
        }
        out
    }

    pub fn set_uniform_weights(&mut self) {
        let n = self.components.len();
        if n == 0 {
            return;
        }
        let w = 1.0 / n as f64;
        self.components.iter_mut().for_each(|c| c.weight = w);
    }

    /// Append a noise block to every component
    ///
    /// Means are extended with zeros and covariances become
    /// `diag(P, noise_covariance)`.
    pub fn augment_with_noise(&mut self, noise_covariance: &DMatrix<f64>) {
        let noise_dim = noise_covariance.nrows();
        for c in self.components.iter_mut() {
            let old_len = c.mean.len();
            c.mean = c.mean.clone().resize_vertically(old_len + noise_dim, 0.0);
            c.covariance = block_diagonal(&c.covariance, noise_covariance);
        }
        self.dim_noise += noise_dim;
    }

    /// Weighted mean of the whole mixture
    ///
    /// The linear part is averaged as usual, angles with the circular mean
    /// and quaternions in their tangent space.
    pub fn weighted_mean(&self) -> DVector<f64> {
        if self.components.is_empty() {
            return DVector::zeros(self.dim());
        }

        let total_weight: f64 = self.components.iter().map(|c| c.weight).sum();
        if total_weight == 0.0 {
            return self.components[0].mean.clone();
        }

        let weights = DVector::from_iterator(
            self.components.len(),
            self.components.iter().map(|c| c.weight / total_weight),
        );
        let means = self.means();
        let mut out = &means * &weights;

        if self.dim_circular > 0 {
            let start = self.dim_linear;
            if self.use_quaternion {
                for j in 0..self.dim_circular {
                    let row = start + 4 * j;
                    let quaternions: Vec<Vector4<f64>> = means
                        .columns(0, means.ncols())
                        .column_iter()
                        .map(|col| col.fixed_rows::<4>(row).into_owned())
                        .collect();
                    let mean_q = quaternion_mean(&quaternions, weights.as_slice());
                    out.fixed_rows_mut::<4>(row).copy_from(&mean_q);
                }
            } else {
                let angles = means.rows(start, self.dim_circular).into_owned();
                out.rows_mut(start, self.dim_circular)
                    .copy_from(&directional_mean(&angles, &weights));
            }
        }

        out
    }
}
