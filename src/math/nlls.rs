//! Nonlinear least squares curve fitting (Levenberg–Marquardt).
//!
//! Fits `y ≈ f(x; p)` for a scalar model with an analytic gradient. Each step
//! solves the damped system
//!
//! ```text
//! minimize ‖J δ - r‖² + λ ‖D δ‖²
//! ```
//!
//! as an augmented least squares problem (`[J; √λ·D] δ = [r; 0]`) with the SVD
//! solver, where `D` holds the column norms of `J` (Marquardt scaling). That
//! keeps the iteration scale invariant, which matters when measured times are
//! microseconds and the parameters start near `1e-7`.

use nalgebra::{DMatrix, DVector};

use crate::error::SolverError;
use crate::math::solve_least_squares;

const LAMBDA_MIN: f64 = 1e-15;
const LAMBDA_MAX: f64 = 1e20;

/// Solver tolerances.
#[derive(Debug, Clone)]
pub struct CurveFitOptions {
    pub max_iterations: usize,
    /// Relative reduction of the residual sum of squares treated as converged.
    pub ftol: f64,
    /// Relative step length treated as converged.
    pub xtol: f64,
    pub initial_lambda: f64,
}

impl Default for CurveFitOptions {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            ftol: 1e-15,
            xtol: 1e-10,
            initial_lambda: 1e-3,
        }
    }
}

/// Fit the parameters of `f` to the samples `(xs, ys)` starting from `p0`.
///
/// `grad(x, p, out)` must write `∂f/∂p_j` into `out[j]`.
pub fn curve_fit<F, G>(
    xs: &[f64],
    ys: &[f64],
    p0: &[f64],
    f: F,
    grad: G,
    opts: &CurveFitOptions,
) -> Result<Vec<f64>, SolverError>
where
    F: Fn(f64, &[f64]) -> f64,
    G: Fn(f64, &[f64], &mut [f64]),
{
    let n = xs.len();
    let k = p0.len();
    if n < k || n != ys.len() {
        return Err(SolverError::InsufficientData {
            required: k,
            found: n.min(ys.len()),
        });
    }

    let sse_of = |p: &[f64]| -> f64 {
        xs.iter()
            .zip(ys)
            .map(|(&x, &y)| {
                let r = y - f(x, p);
                r * r
            })
            .sum()
    };

    let mut p = p0.to_vec();
    let mut sse = sse_of(&p);
    if !sse.is_finite() {
        return Err(SolverError::NonFinite);
    }

    let mut lambda = opts.initial_lambda;
    let mut row = vec![0.0; k];

    for _ in 0..opts.max_iterations {
        let mut jac = DMatrix::<f64>::zeros(n, k);
        let mut r = DVector::<f64>::zeros(n + k);
        for (i, (&x, &y)) in xs.iter().zip(ys).enumerate() {
            grad(x, &p, &mut row);
            for j in 0..k {
                jac[(i, j)] = row[j];
            }
            r[i] = y - f(x, &p);
        }
        if jac.iter().chain(r.iter()).any(|v| !v.is_finite()) {
            return Err(SolverError::NonFinite);
        }

        let scale: Vec<f64> = (0..k)
            .map(|j| {
                let norm = jac.column(j).norm();
                if norm > 0.0 { norm } else { 1.0 }
            })
            .collect();

        // Inner loop: raise λ until a step does not increase the SSE.
        loop {
            let mut aug = DMatrix::<f64>::zeros(n + k, k);
            aug.view_mut((0, 0), (n, k)).copy_from(&jac);
            let damping = lambda.sqrt();
            for j in 0..k {
                aug[(n + j, j)] = damping * scale[j];
            }

            let delta = match solve_least_squares(&aug, &r) {
                Ok(delta) => delta,
                Err(_) => {
                    lambda *= 10.0;
                    if lambda > LAMBDA_MAX {
                        return Err(SolverError::Singular);
                    }
                    continue;
                }
            };

            let p_norm = p.iter().map(|v| v * v).sum::<f64>().sqrt();
            if delta.norm() <= opts.xtol * (p_norm + opts.xtol) {
                return Ok(p);
            }

            let candidate: Vec<f64> = p.iter().zip(delta.iter()).map(|(a, d)| a + d).collect();
            let sse_new = sse_of(&candidate);

            if sse_new.is_finite() && sse_new <= sse {
                let reduction = sse - sse_new;
                p = candidate;
                sse = sse_new;
                lambda = (lambda / 10.0).max(LAMBDA_MIN);
                if reduction <= opts.ftol * (sse + reduction) {
                    return Ok(p);
                }
                break;
            }

            lambda *= 10.0;
            if lambda > LAMBDA_MAX {
                // No descent direction left: `p` is a minimum to working precision.
                return Ok(p);
            }
        }
    }

    Err(SolverError::NoConvergence {
        iterations: opts.max_iterations,
    })
}
