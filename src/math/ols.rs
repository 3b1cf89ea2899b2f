//! Least squares solver.
//!
//! Every fit in this crate reduces to small problems of the form:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! either directly (every family is linear in its parameters) or as the inner
//! step of the Levenberg–Marquardt fallback.
//!
//! We solve with SVD rather than the normal equations: timing samples span many
//! orders of magnitude (`e^x` columns next to small sizes), and the design
//! matrices are tall and sometimes rank deficient (fewer distinct samples than
//! parameters). SVD returns the minimum-norm solution in that case instead of
//! failing.

use nalgebra::{DMatrix, DVector};

use crate::error::SolverError;

/// Solve a least squares problem using SVD.
///
/// Fails with `SolverError::Singular` if no tolerance yields a finite solution.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<DVector<f64>, SolverError> {
    if x.nrows() == 0 || x.ncols() == 0 || x.nrows() != y.len() {
        return Err(SolverError::Singular);
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(SolverError::NonFinite);
    }

    let svd = x.clone().svd(true, true);

    // Singular values below `tol * σ_max` are treated as zero.
    let sigma_max = svd.singular_values.max();
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol * sigma_max.max(f64::MIN_POSITIVE)) {
            if beta.iter().all(|v| v.is_finite()) {
                return Ok(beta);
            }
        }
    }

    Err(SolverError::Singular)
}

/// Running mean; exact when every value is identical.
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut m = 0.0;
    for (i, v) in values.enumerate() {
        m += (v - m) / (i + 1) as f64;
    }
    m
}

/// Ordinary least squares with an intercept.
///
/// Features and targets are centered before the SVD solve and the intercept
/// is recovered from the means. Constant targets therefore give exactly zero
/// coefficients and an intercept equal to that constant.
///
/// Returns `(intercept, coefficients)`.
///
/// # Panics
/// Panics if rows have different lengths.
pub fn ols_with_intercept(rows: &[Vec<f64>], y: &[f64]) -> Result<(f64, Vec<f64>), SolverError> {
    if rows.is_empty() || rows.len() != y.len() {
        return Err(SolverError::Singular);
    }
    if rows.iter().flatten().chain(y).any(|v| !v.is_finite()) {
        return Err(SolverError::NonFinite);
    }

    let y_mean = mean(y.iter().copied());
    let p = rows[0].len();
    if p == 0 {
        return Ok((y_mean, Vec::new()));
    }
    let x_means: Vec<f64> = (0..p).map(|j| mean(rows.iter().map(|r| r[j]))).collect();

    let x = DMatrix::from_fn(rows.len(), p, |i, j| rows[i][j] - x_means[j]);
    let yc = DVector::from_iterator(y.len(), y.iter().map(|v| v - y_mean));
    let beta = solve_least_squares(&x, &yc)?;

    let intercept = y_mean - x_means.iter().zip(beta.iter()).map(|(m, b)| m * b).sum::<f64>();
    Ok((intercept, beta.iter().copied().collect()))
}
