//! Linear algebra utilities
//!
//! Gaussian densities, matrix square roots and log-domain helpers used by
//! the sigma-point and particle machinery.

use nalgebra::{DMatrix, DVector};
use std::f64::consts::PI;

/// Relative tolerance below which a negative eigenvalue is treated as zero
const PSD_TOLERANCE: f64 = 1e-9;

/// Compute multivariate Gaussian PDF
///
/// # Arguments
/// * `x` - Point to evaluate (column vector)
/// * `mu` - Mean vector
/// * `sigma` - Covariance matrix
///
/// # Returns
/// Probability density value, `0.0` for a singular covariance
pub fn gaussian_pdf(x: &DVector<f64>, mu: &DVector<f64>, sigma: &DMatrix<f64>) -> f64 {
    let log_pdf = log_gaussian_pdf(x, mu, sigma);
    if log_pdf == f64::NEG_INFINITY {
        0.0
    } else {
        log_pdf.exp()
    }
}

/// Compute log Gaussian PDF for numerical stability
pub fn log_gaussian_pdf(x: &DVector<f64>, mu: &DVector<f64>, sigma: &DMatrix<f64>) -> f64 {
    let n = x.len() as f64;
    let diff = x - mu;

    match sigma.clone().cholesky() {
        Some(chol) => {
            let inv_sigma_diff = chol.solve(&diff);
            let mahalanobis = diff.dot(&inv_sigma_diff);
            // log|Σ| = 2 Σ log Lᵢᵢ
            let log_det: f64 = chol.l_dirty().diagonal().iter().map(|d| d.ln()).sum::<f64>() * 2.0;

            -0.5 * (n * (2.0 * PI).ln() + log_det + mahalanobis)
        }
        None => f64::NEG_INFINITY,
    }
}

/// Gaussian density of every column of `x` under `N(mu, sigma)`
pub fn gaussian_pdf_columns(x: &DMatrix<f64>, mu: &DVector<f64>, sigma: &DMatrix<f64>) -> DVector<f64> {
    DVector::from_iterator(
        x.ncols(),
        x.column_iter().map(|col| gaussian_pdf(&col.into_owned(), mu, sigma)),
    )
}

/// Square root `S` of a symmetric positive semi-definite matrix, `S Sᵀ = A`
///
/// Tries a Cholesky factorisation first. Semi-definite inputs (which
/// Cholesky rejects) fall back to a symmetric eigendecomposition
/// `S = V √D`. Returns `None` when `A` has an eigenvalue that is
/// significantly negative.
pub fn psd_sqrt(matrix: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    if matrix.nrows() != matrix.ncols() {
        return None;
    }
    if matrix.nrows() == 0 {
        return Some(DMatrix::zeros(0, 0));
    }

    let sym = symmetrize(matrix);
    if let Some(chol) = sym.clone().cholesky() {
        return Some(chol.l());
    }

    let eigen = sym.symmetric_eigen();
    let scale = eigen
        .eigenvalues
        .iter()
        .fold(0.0_f64, |acc, v| acc.max(v.abs()))
        .max(1.0);

    if eigen.eigenvalues.iter().any(|v| *v < -PSD_TOLERANCE * scale) {
        return None;
    }

    let sqrt_d = eigen.eigenvalues.map(|v| v.max(0.0).sqrt());
    Some(&eigen.eigenvectors * DMatrix::from_diagonal(&sqrt_d))
}

/// Compute log-sum-exp for numerical stability
///
/// Computes log(sum(exp(x))) in a numerically stable way
pub fn log_sum_exp(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NEG_INFINITY;
    }

    let max_val = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max_val.is_infinite() && max_val < 0.0 {
        return f64::NEG_INFINITY;
    }

    let sum: f64 = values.iter().map(|v| (v - max_val).exp()).sum();
    max_val + sum.ln()
}

/// Make matrix symmetric
///
/// Ensures a matrix is symmetric by averaging with its transpose
pub fn symmetrize(matrix: &DMatrix<f64>) -> DMatrix<f64> {
    0.5 * (matrix + matrix.transpose())
}

/// Block-diagonal matrix `diag(a, b)`
pub fn block_diagonal(a: &DMatrix<f64>, b: &DMatrix<f64>) -> DMatrix<f64> {
    let n = a.nrows() + b.nrows();
    let m = a.ncols() + b.ncols();
    let mut out = DMatrix::zeros(n, m);
    out.view_mut((0, 0), a.shape()).copy_from(a);
    out.view_mut((a.nrows(), a.ncols()), b.shape()).copy_from(b);
    out
}
