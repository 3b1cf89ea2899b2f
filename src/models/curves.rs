//! The four registered curve families.
//!
//! - Exponential: `y = a + b·e^x` (one feature, exact solve with a Levenberg–Marquardt fallback)
//! - Logarithmic: `y = a + b·ln(x)` (one feature, same as Exponential)
//! - Linear: `y = b + Σ c_i·x_i` (any arity, OLS)
//! - Polynomial: degree-2 basis over all features (any arity, OLS)

use crate::domain::{CurveKind, Parameters, PointSet};
use crate::error::SolverError;
use crate::math::{
    CurveFitOptions, curve_fit, features_for_term_count, ols_with_intercept, quadratic_term_names,
    quadratic_terms,
};
use crate::models::model::{CurveModel, round_to};

/// Starting points for Levenberg–Marquardt. Exponential starts near the
/// microsecond scale of typical measurements, never at zero.
const EXPONENTIAL_INITIAL_GUESS: [f64; 2] = [1e-7, 1e-7];
const LOGARITHMIC_INITIAL_GUESS: [f64; 2] = [1.0, 1.0];

fn poll_single_feature(points: &PointSet) -> bool {
    !points.is_empty() && points.points().iter().all(|p| p.features.len() == 1)
}

fn poll_uniform_features(points: &PointSet) -> bool {
    matches!(points.uniform_arity(), Some(n) if n > 0)
}

fn require_points(points: &PointSet, required: usize) -> Result<(), SolverError> {
    if points.len() < required {
        return Err(SolverError::InsufficientData {
            required,
            found: points.len(),
        });
    }
    Ok(())
}

/// Fit `a + b·g(x)` for a single-feature point set.
///
/// The model is linear in `(a, b)`, so the exact solve on the `g(x)` column
/// comes first; Levenberg–Marquardt from `p0` is the fallback.
fn fit_two_parameter(
    points: &PointSet,
    p0: [f64; 2],
    g: fn(f64) -> f64,
) -> Result<Parameters, SolverError> {
    require_points(points, 2)?;
    let xs: Vec<f64> = points.points().iter().map(|p| p.features[0]).collect();
    let ys = points.times();

    let column: Vec<Vec<f64>> = xs.iter().map(|&x| vec![g(x)]).collect();
    let (a, b) = match ols_with_intercept(&column, &ys) {
        Ok((a, coef)) => (a, coef[0]),
        Err(_) => {
            let p = curve_fit(
                &xs,
                &ys,
                &p0,
                |x, p| p[0] + p[1] * g(x),
                |x, _p, out| {
                    out[0] = 1.0;
                    out[1] = g(x);
                },
                &CurveFitOptions::default(),
            )?;
            (p[0], p[1])
        }
    };

    Ok([("a", a), ("b", b)].into_iter().collect())
}

fn param(parameters: &Parameters, name: &str) -> f64 {
    parameters.get(name).unwrap_or(f64::NAN)
}

/// Split parameters into the intercept and the ordered coefficients after it.
fn intercept_and_coefficients(parameters: &Parameters) -> (f64, Vec<f64>) {
    let mut values = parameters.values();
    let b = values.next().unwrap_or(f64::NAN);
    (b, values.collect())
}

fn sum_of_terms(parameters: &Parameters, rounding: u32) -> String {
    let mut out = format!("y = {}", round_to(param(parameters, "b"), rounding));
    for (name, value) in parameters.iter().skip(1) {
        out.push_str(&format!(" + {}{}", round_to(value, rounding), name));
    }
    out
}

#[derive(Debug, Clone, Copy)]
pub struct ExponentialCurve;

impl CurveModel for ExponentialCurve {
    fn kind(&self) -> CurveKind {
        CurveKind::Exponential
    }

    fn poll(&self, points: &PointSet) -> bool {
        poll_single_feature(points)
    }

    fn calculate_curve(&self, points: &PointSet) -> Result<Parameters, SolverError> {
        fit_two_parameter(points, EXPONENTIAL_INITIAL_GUESS, f64::exp)
    }

    fn calculate_point(&self, features: &[f64], parameters: &Parameters) -> f64 {
        let x = features.first().copied().unwrap_or(f64::NAN);
        param(parameters, "a") + param(parameters, "b") * x.exp()
    }

    fn equation(&self, parameters: &Parameters, rounding: u32) -> String {
        format!(
            "y = {} + {}e^x",
            round_to(param(parameters, "a"), rounding),
            round_to(param(parameters, "b"), rounding)
        )
    }

    fn arity(&self, parameters: &Parameters) -> Option<usize> {
        (parameters.get("a").is_some() && parameters.get("b").is_some()).then_some(1)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LogarithmicCurve;

impl CurveModel for LogarithmicCurve {
    fn kind(&self) -> CurveKind {
        CurveKind::Logarithmic
    }

    fn poll(&self, points: &PointSet) -> bool {
        poll_single_feature(points)
    }

    fn calculate_curve(&self, points: &PointSet) -> Result<Parameters, SolverError> {
        fit_two_parameter(points, LOGARITHMIC_INITIAL_GUESS, f64::ln)
    }

    fn calculate_point(&self, features: &[f64], parameters: &Parameters) -> f64 {
        let x = features.first().copied().unwrap_or(f64::NAN);
        param(parameters, "a") + param(parameters, "b") * x.ln()
    }

    fn equation(&self, parameters: &Parameters, rounding: u32) -> String {
        format!(
            "y = {} + {}*log(x)",
            round_to(param(parameters, "a"), rounding),
            round_to(param(parameters, "b"), rounding)
        )
    }

    fn arity(&self, parameters: &Parameters) -> Option<usize> {
        (parameters.get("a").is_some() && parameters.get("b").is_some()).then_some(1)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LinearCurve;

impl CurveModel for LinearCurve {
    fn kind(&self) -> CurveKind {
        CurveKind::Linear
    }

    fn poll(&self, points: &PointSet) -> bool {
        poll_uniform_features(points)
    }

    fn calculate_curve(&self, points: &PointSet) -> Result<Parameters, SolverError> {
        require_points(points, 2)?;
        let (b, coef) = ols_with_intercept(&points.rows(), &points.times())?;

        let mut params = Parameters::new();
        params.push("b", b);
        for (name, c) in points.feature_names().into_iter().zip(coef) {
            params.push(name, c);
        }
        Ok(params)
    }

    fn calculate_point(&self, features: &[f64], parameters: &Parameters) -> f64 {
        let (b, coef) = intercept_and_coefficients(parameters);
        b + features.iter().zip(&coef).map(|(x, c)| x * c).sum::<f64>()
    }

    fn equation(&self, parameters: &Parameters, rounding: u32) -> String {
        sum_of_terms(parameters, rounding)
    }

    fn arity(&self, parameters: &Parameters) -> Option<usize> {
        parameters.len().checked_sub(1)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PolynomialCurve;

impl CurveModel for PolynomialCurve {
    fn kind(&self) -> CurveKind {
        CurveKind::Polynomial
    }

    fn poll(&self, points: &PointSet) -> bool {
        poll_uniform_features(points)
    }

    fn calculate_curve(&self, points: &PointSet) -> Result<Parameters, SolverError> {
        require_points(points, 3)?;
        let expanded: Vec<Vec<f64>> = points
            .points()
            .iter()
            .map(|p| quadratic_terms(&p.features))
            .collect();
        let (b, coef) = ols_with_intercept(&expanded, &points.times())?;

        let mut params = Parameters::new();
        params.push("b", b);
        for (name, c) in quadratic_term_names(&points.feature_names()).into_iter().zip(coef) {
            params.push(name, c);
        }
        Ok(params)
    }

    fn calculate_point(&self, features: &[f64], parameters: &Parameters) -> f64 {
        let (b, coef) = intercept_and_coefficients(parameters);
        b + quadratic_terms(features)
            .iter()
            .zip(&coef)
            .map(|(t, c)| t * c)
            .sum::<f64>()
    }

    fn equation(&self, parameters: &Parameters, rounding: u32) -> String {
        sum_of_terms(parameters, rounding)
    }

    fn arity(&self, parameters: &Parameters) -> Option<usize> {
        features_for_term_count(parameters.len().checked_sub(1)?)
    }
}
