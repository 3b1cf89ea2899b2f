//! The curve model contract.
//!
//! Selection code only needs four operations from a family:
//! - `poll`: can this family be fit to these samples at all?
//! - `calculate_curve`: fit the parameters
//! - `calculate_point`: evaluate the fitted curve (for scoring and prediction)
//! - `equation`: render the fitted curve for humans

use crate::domain::{Arguments, CurveKind, Parameters, PointSet};
use crate::error::{Error, Result, SolverError};
use crate::models::curves::{ExponentialCurve, LinearCurve, LogarithmicCurve, PolynomialCurve};

pub trait CurveModel: std::fmt::Debug + Sync {
    fn kind(&self) -> CurveKind;

    /// Cheap applicability check, run before fitting.
    fn poll(&self, points: &PointSet) -> bool;

    /// Fit the family's free parameters to the samples.
    fn calculate_curve(&self, points: &PointSet) -> std::result::Result<Parameters, SolverError>;

    /// Evaluate the fitted curve at a feature vector.
    ///
    /// The feature vector must have the arity implied by `parameters`.
    fn calculate_point(&self, features: &[f64], parameters: &Parameters) -> f64;

    /// Human-readable formula with coefficients rounded to `rounding` digits.
    fn equation(&self, parameters: &Parameters, rounding: u32) -> String;

    /// Feature arity implied by `parameters`, if they are well formed.
    fn arity(&self, parameters: &Parameters) -> Option<usize>;
}

impl CurveKind {
    pub fn model(self) -> &'static dyn CurveModel {
        match self {
            CurveKind::Exponential => &ExponentialCurve,
            CurveKind::Linear => &LinearCurve,
            CurveKind::Logarithmic => &LogarithmicCurve,
            CurveKind::Polynomial => &PolynomialCurve,
        }
    }
}

/// Turn call arguments into a feature vector without exclusions or transformers.
pub fn raw_features(arguments: &Arguments) -> Result<Vec<f64>> {
    arguments
        .slots()
        .map(|(key, value)| {
            value
                .as_f64()
                .ok_or_else(|| Error::NonNumericArgument { slot: key.to_string() })
        })
        .collect()
}

/// Evaluate `model` with `parameters` at the given call arguments.
pub fn predict_with(model: &dyn CurveModel, parameters: &Parameters, arguments: &Arguments) -> Result<f64> {
    let features = raw_features(arguments)?;
    match model.arity(parameters) {
        Some(expected) if expected == features.len() => Ok(model.calculate_point(&features, parameters)),
        expected => Err(Error::ArityMismatch {
            curve: model.kind(),
            expected: expected.unwrap_or(0),
            found: features.len(),
        }),
    }
}

/// Round to `digits` decimal places, normalising `-0`.
pub(crate) fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits.min(15) as i32);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 { 0.0 } else { rounded }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_to_is_deterministic() {
        assert_eq!(round_to(1.23456789, 3), 1.235);
        assert_eq!(round_to(-0.0000001, 4).to_string(), "0");
        assert_eq!(format!("{}", round_to(1.23456789e-6, 8)), "0.00000123");
    }

    #[test]
    fn raw_features_reject_text() {
        let args = Arguments::new().arg(1).named("name", "Arthur");
        let err = raw_features(&args).unwrap_err();
        assert!(matches!(err, Error::NonNumericArgument { ref slot } if slot == "name"));
    }

    #[test]
    fn prediction_checks_arity() {
        let params: Parameters = [("a", 1.0), ("b", 2.0)].into_iter().collect();
        let model = CurveKind::Logarithmic.model();
        let err = predict_with(model, &params, &Arguments::new().arg(1).arg(2)).unwrap_err();
        assert!(matches!(err, Error::ArityMismatch { expected: 1, found: 2, .. }));

        let y = predict_with(model, &params, &Arguments::new().arg(1)).unwrap();
        assert!((y - 1.0).abs() < 1e-12);
    }
}
