//! Curve selection.
//!
//! Every applicable family is fit and scored by its total absolute residual:
//!
//! ```text
//! score = Σ |time_i - f(x_i)|
//! ```
//!
//! Selection rules:
//! 1. Skip families whose `poll` rejects the samples.
//! 2. Skip families whose solver fails or whose score is not finite (both are
//!    recorded in `FitReport::skipped` and logged).
//! 3. Pick the strictly smallest score; on ties the earlier family in
//!    registration order wins.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::domain::{CurveKind, CurveSelection, FittedCurve, PointSet, Run};
use crate::error::{Error, Result, SolverError};
use crate::fit::projector::{ArgumentProjector, Exclusions, Transformers};
use crate::models::{CurveModel, CurveRegistry};

/// A fitted family and its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredFit {
    pub curve: FittedCurve,
    pub score: f64,
}

/// Why a family did not take part in selection.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// `poll` rejected the samples (wrong feature arity).
    Rejected,
    Failed(SolverError),
    NonFiniteScore,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Rejected => f.write_str("not applicable to these arguments"),
            SkipReason::Failed(e) => write!(f, "fit failed: {e}"),
            SkipReason::NonFiniteScore => f.write_str("fit produced non-finite predictions"),
        }
    }
}

impl Serialize for SkipReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedCurve {
    pub kind: CurveKind,
    pub reason: SkipReason,
}

/// Output of fitting + selection for one split.
#[derive(Debug, Clone, Serialize)]
pub struct FitReport {
    pub label: String,
    pub samples: usize,
    /// Parameter names of the feature positions (`x_0`, `x_n`, ...).
    pub features: Vec<String>,
    /// Every family that was fit, in registration order.
    pub fits: Vec<ScoredFit>,
    pub skipped: Vec<SkippedCurve>,
    pub best: Option<ScoredFit>,
}

/// Project `runs`, fit the selected families and pick the best one.
pub fn evaluate_curves(
    registry: &CurveRegistry,
    label: &str,
    runs: &[Run],
    selection: CurveSelection,
    exclude: &Exclusions,
    transformers: &Transformers,
) -> Result<FitReport> {
    let points = ArgumentProjector::new(exclude, transformers).point_set(runs)?;

    let mut report = FitReport {
        label: label.to_string(),
        samples: points.len(),
        features: points.feature_names(),
        fits: Vec::new(),
        skipped: Vec::new(),
        best: None,
    };

    match selection {
        CurveSelection::Family(kind) => {
            let model = registry.get(kind)?;
            if !model.poll(&points) {
                return Err(Error::UnsupportedCurve { curve: kind });
            }
            let parameters = model
                .calculate_curve(&points)
                .map_err(|source| Error::Fit { curve: kind, source })?;
            let curve = FittedCurve { kind, parameters };
            let fit = ScoredFit {
                score: score(model, &points, &curve),
                curve,
            };
            report.fits.push(fit.clone());
            report.best = Some(fit);
        }
        CurveSelection::Automatic => {
            for model in registry.iter() {
                match fit_one(model, &points) {
                    Ok(fit) => {
                        tracing::debug!(curve = %model.kind(), score = fit.score, "scored curve");
                        report.fits.push(fit);
                    }
                    Err(reason) => {
                        if matches!(reason, SkipReason::Rejected) {
                            tracing::debug!(curve = %model.kind(), "curve not applicable");
                        } else {
                            tracing::warn!(split = %label, curve = %model.kind(), %reason, "skipping curve");
                        }
                        report.skipped.push(SkippedCurve {
                            kind: model.kind(),
                            reason,
                        });
                    }
                }
            }
            report.best = select_lowest_score(&report.fits).cloned();
        }
    }

    match &report.best {
        Some(best) => tracing::info!(split = %label, curve = %best.curve.kind, score = best.score, "best fit"),
        None => tracing::info!(split = %label, "no applicable curve"),
    }

    Ok(report)
}

fn fit_one(model: &dyn CurveModel, points: &PointSet) -> std::result::Result<ScoredFit, SkipReason> {
    if !model.poll(points) {
        return Err(SkipReason::Rejected);
    }
    let parameters = model.calculate_curve(points).map_err(SkipReason::Failed)?;
    let curve = FittedCurve {
        kind: model.kind(),
        parameters,
    };
    let score = score(model, points, &curve);
    if !score.is_finite() {
        return Err(SkipReason::NonFiniteScore);
    }
    Ok(ScoredFit { curve, score })
}

/// Sum of absolute residuals of `curve` over `points`.
pub fn score(model: &dyn CurveModel, points: &PointSet, curve: &FittedCurve) -> f64 {
    points
        .points()
        .iter()
        .map(|p| (p.time - model.calculate_point(&p.features, &curve.parameters)).abs())
        .sum()
}

/// The fit with the strictly smallest score; the first one wins ties.
pub fn select_lowest_score(fits: &[ScoredFit]) -> Option<&ScoredFit> {
    let mut best: Option<&ScoredFit> = None;
    for fit in fits {
        if best.is_none_or(|b| fit.score < b.score) {
            best = Some(fit);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use std::f64::consts::E;

    use super::*;
    use crate::domain::{Arguments, Parameters};

    fn runs_from(xy: &[(f64, f64)]) -> Vec<Run> {
        xy.iter()
            .map(|&(x, y)| Run::new(x.to_string(), y).with_arguments(Arguments::new().arg(x)))
            .collect()
    }

    fn auto(runs: &[Run]) -> FitReport {
        evaluate_curves(
            &CurveRegistry::default(),
            "test",
            runs,
            CurveSelection::Automatic,
            &Exclusions::new(),
            &Transformers::None,
        )
        .unwrap()
    }

    fn fixed(kind: CurveKind, score: f64) -> ScoredFit {
        ScoredFit {
            curve: FittedCurve {
                kind,
                parameters: Parameters::new(),
            },
            score,
        }
    }

    #[test]
    fn ties_keep_registration_order() {
        let fits = vec![
            fixed(CurveKind::Exponential, 1.0),
            fixed(CurveKind::Linear, 1.0),
            fixed(CurveKind::Polynomial, 1.0),
        ];
        assert_eq!(select_lowest_score(&fits).unwrap().curve.kind, CurveKind::Exponential);

        let fits = vec![fixed(CurveKind::Linear, 2.0), fixed(CurveKind::Polynomial, 1.5)];
        assert_eq!(select_lowest_score(&fits).unwrap().curve.kind, CurveKind::Polynomial);
        assert!(select_lowest_score(&[]).is_none());
    }

    #[test]
    fn constant_times_tie_and_the_first_family_wins() {
        let runs = runs_from(&[(1.0, 4.0), (2.0, 4.0), (3.0, 4.0), (4.0, 4.0)]);
        let report = auto(&runs);
        let scores: Vec<_> = report.fits.iter().map(|f| (f.curve.kind, f.score)).collect();
        assert_eq!(
            scores,
            [
                (CurveKind::Exponential, 0.0),
                (CurveKind::Linear, 0.0),
                (CurveKind::Logarithmic, 0.0),
                (CurveKind::Polynomial, 0.0),
            ]
        );
        let best = report.best.unwrap().curve;
        assert_eq!(best.kind, CurveKind::Exponential);
        assert_eq!(best.parameters.get("a"), Some(4.0));
    }

    #[test]
    fn auto_selects_exponential_on_exponential_data() {
        let runs = runs_from(&(0..5).map(|i| {
            let x = (i * 2) as f64;
            (x, x.exp())
        }).collect::<Vec<_>>());

        let report = auto(&runs);
        let best = report.best.unwrap();
        assert_eq!(best.curve.kind, CurveKind::Exponential);
        assert!((best.curve.parameters.get("a").unwrap()).abs() < 1e-3);
        assert!((best.curve.parameters.get("b").unwrap() - 1.0).abs() < 1e-3);

        let linear = report.fits.iter().find(|f| f.curve.kind == CurveKind::Linear).unwrap();
        let poly = report.fits.iter().find(|f| f.curve.kind == CurveKind::Polynomial).unwrap();
        assert!(linear.score > best.score);
        assert!(poly.score > best.score);
    }

    #[test]
    fn auto_selects_logarithmic_on_log_data() {
        let runs = runs_from(&(1..6).map(|x| {
            let x = x as f64;
            (x, 2.0 + 3.0 * x.ln())
        }).collect::<Vec<_>>());
        let best = auto(&runs).best.unwrap();
        assert_eq!(best.curve.kind, CurveKind::Logarithmic);
        assert!((best.curve.parameters.get("a").unwrap() - 2.0).abs() < 1e-4);
        assert!((best.curve.parameters.get("b").unwrap() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn auto_selects_polynomial_on_quadratic_data() {
        // y = 4 + 2x + 4x^2
        let runs = runs_from(&[(1.0, 10.0), (2.0, 24.0), (3.0, 46.0)]);
        let best = auto(&runs).best.unwrap();
        assert_eq!(best.curve.kind, CurveKind::Polynomial);
        let values: Vec<f64> = best.curve.parameters.values().collect();
        for (got, want) in values.iter().zip([4.0, 2.0, 4.0]) {
            assert!((got - want).abs() < 1e-6, "{values:?}");
        }
    }

    #[test]
    fn two_arguments_never_select_single_feature_families() {
        let runs: Vec<Run> = [(1.0, 2.0, 5.0), (2.0, 1.0, 4.0), (3.0, 5.0, 12.0), (4.0, 3.0, 10.0)]
            .iter()
            .map(|&(a, b, y)| Run::new("r", y).with_arguments(Arguments::new().arg(a).arg(b)))
            .collect();

        let report = auto(&runs);
        let skipped: Vec<_> = report.skipped.iter().map(|s| s.kind).collect();
        assert_eq!(skipped, [CurveKind::Exponential, CurveKind::Logarithmic]);
        assert!(report.skipped.iter().all(|s| s.reason == SkipReason::Rejected));
        let best = report.best.unwrap().curve.kind;
        assert!(matches!(best, CurveKind::Linear | CurveKind::Polynomial));
    }

    #[test]
    fn solver_failures_are_skipped_during_automatic_selection() {
        // ln(0) makes the logarithmic fit non-finite; the others still compete.
        let runs = runs_from(&[(0.0, 1.0), (1.0, 2.0), (2.0, 3.0), (3.0, 4.0)]);
        let report = auto(&runs);
        let log_skip = report
            .skipped
            .iter()
            .find(|s| s.kind == CurveKind::Logarithmic)
            .unwrap();
        assert_eq!(log_skip.reason, SkipReason::Failed(SolverError::NonFinite));
        assert!(report.best.is_some());
    }

    #[test]
    fn explicit_family_surfaces_failures() {
        let runs = runs_from(&[(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)]);
        let err = evaluate_curves(
            &CurveRegistry::default(),
            "test",
            &runs,
            CurveSelection::Family(CurveKind::Logarithmic),
            &Exclusions::new(),
            &Transformers::None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Fit { curve: CurveKind::Logarithmic, .. }));
    }

    #[test]
    fn explicit_family_overrides_the_better_fit() {
        let runs = runs_from(&[(2.0, E.powi(2)), (5.0, E.powi(5)), (8.0, E.powi(8))]);
        let report = evaluate_curves(
            &CurveRegistry::default(),
            "test",
            &runs,
            CurveSelection::Family(CurveKind::Linear),
            &Exclusions::new(),
            &Transformers::None,
        )
        .unwrap();
        assert_eq!(report.best.unwrap().curve.kind, CurveKind::Linear);
    }

    #[test]
    fn unregistered_family_is_unknown() {
        let registry = CurveRegistry::with_kinds([CurveKind::Linear]);
        let runs = runs_from(&[(1.0, 1.0), (2.0, 2.0)]);
        let err = evaluate_curves(
            &registry,
            "test",
            &runs,
            CurveSelection::Family(CurveKind::Exponential),
            &Exclusions::new(),
            &Transformers::None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnknownCurveType { .. }));
    }
}
