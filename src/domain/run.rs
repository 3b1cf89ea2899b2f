//! Measurement records.
//!
//! A `Run` is one timed sample; a `Split` is an append-only, labelled series of
//! runs with aggregate statistics and the entry points for curve fitting.

use serde::Serialize;

use crate::domain::{Arguments, CurveSelection, FittedCurve};
use crate::error::Result;
use crate::fit::{self, Exclusions, FitReport, Transformers};
use crate::models::CurveRegistry;

/// One measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub label: String,
    /// Elapsed time in seconds.
    pub time: f64,
    pub runs: u32,
    pub iterations_per_run: u32,
    /// Logged call arguments; empty if arguments were not logged.
    pub arguments: Arguments,
}

impl Run {
    pub fn new(label: impl Into<String>, time: f64) -> Self {
        Self {
            label: label.into(),
            time,
            runs: 1,
            iterations_per_run: 1,
            arguments: Arguments::default(),
        }
    }

    pub fn with_arguments(mut self, arguments: Arguments) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn with_counts(mut self, runs: u32, iterations_per_run: u32) -> Self {
        self.runs = runs.max(1);
        self.iterations_per_run = iterations_per_run.max(1);
        self
    }

    pub fn has_arguments(&self) -> bool {
        !self.arguments.is_empty()
    }
}

/// A labelled series of runs.
#[derive(Debug, Clone, Default)]
pub struct Split {
    label: String,
    runs: Vec<Run>,
}

/// Aggregate statistics for a split (seconds).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SplitStats {
    pub runs: usize,
    pub total: f64,
    pub average: f64,
    pub standard_deviation: f64,
    pub variance: f64,
}

impl Split {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            runs: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn add_run(&mut self, run: Run) {
        self.runs.push(run);
    }

    pub fn total_time(&self) -> f64 {
        self.runs.iter().map(|r| r.time).sum()
    }

    pub fn average(&self) -> f64 {
        if self.runs.is_empty() {
            return 0.0;
        }
        self.total_time() / self.runs.len() as f64
    }

    /// Population standard deviation (divides by `n`).
    pub fn standard_deviation(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn variance(&self) -> f64 {
        if self.runs.is_empty() {
            return 0.0;
        }
        let avg = self.average();
        let sum_sq: f64 = self.runs.iter().map(|r| (r.time - avg).powi(2)).sum();
        sum_sq / self.runs.len() as f64
    }

    pub fn stats(&self) -> SplitStats {
        SplitStats {
            runs: self.runs.len(),
            total: self.total_time(),
            average: self.average(),
            standard_deviation: self.standard_deviation(),
            variance: self.variance(),
        }
    }

    /// Fit the requested curve family (or every registered family) to this split.
    ///
    /// Returns `Ok(None)` when automatic selection finds no applicable family.
    pub fn determine_best_fit(
        &self,
        selection: CurveSelection,
        exclude: &Exclusions,
        transformers: &Transformers,
    ) -> Result<Option<FittedCurve>> {
        let report = self.evaluate_curves(&CurveRegistry::default(), selection, exclude, transformers)?;
        Ok(report.best.map(|best| best.curve))
    }

    /// Like [`Split::determine_best_fit`], but keeps every scored and skipped family.
    pub fn evaluate_curves(
        &self,
        registry: &CurveRegistry,
        selection: CurveSelection,
        exclude: &Exclusions,
        transformers: &Transformers,
    ) -> Result<FitReport> {
        // Snapshot: later appends never leak into a fit in progress.
        fit::evaluate_curves(registry, &self.label, &self.runs, selection, exclude, transformers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split_with_times(times: &[f64]) -> Split {
        let mut split = Split::new("s");
        for (i, &t) in times.iter().enumerate() {
            split.add_run(Run::new(format!("r{i}"), t));
        }
        split
    }

    #[test]
    fn empty_split_statistics_are_zero() {
        let split = Split::new("empty");
        assert_eq!(split.average(), 0.0);
        assert_eq!(split.standard_deviation(), 0.0);
        assert_eq!(split.variance(), 0.0);
        assert_eq!(split.total_time(), 0.0);
    }

    #[test]
    fn statistics_use_population_deviation() {
        let split = split_with_times(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((split.average() - 5.0).abs() < 1e-12);
        assert!((split.standard_deviation() - 2.0).abs() < 1e-12);
        assert!((split.variance() - 4.0).abs() < 1e-12);
        assert!((split.total_time() - 40.0).abs() < 1e-12);
    }

    #[test]
    fn runs_keep_insertion_order() {
        let split = split_with_times(&[3.0, 1.0, 2.0]);
        let labels: Vec<_> = split.runs().iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["r0", "r1", "r2"]);
    }

    #[test]
    fn best_fit_requires_logged_arguments_for_every_selection() {
        let split = split_with_times(&[1.0, 2.0, 3.0]);
        let selections = std::iter::once(CurveSelection::Automatic)
            .chain(crate::domain::CurveKind::ALL.into_iter().map(CurveSelection::Family));
        for selection in selections {
            let err = split
                .determine_best_fit(selection, &Exclusions::new(), &Transformers::None)
                .unwrap_err();
            assert!(matches!(err, crate::error::Error::ArgumentsRequired), "{selection:?}");
        }
    }

    #[test]
    fn best_fit_is_idempotent() {
        let mut split = Split::new("s");
        for x in 1..=6 {
            let x = x as f64;
            split.add_run(Run::new("f", 0.5 * x * x + 0.1).with_arguments(Arguments::new().arg(x)));
        }
        let first = split
            .determine_best_fit(CurveSelection::Automatic, &Exclusions::new(), &Transformers::None)
            .unwrap();
        let second = split
            .determine_best_fit(CurveSelection::Automatic, &Exclusions::new(), &Transformers::None)
            .unwrap();
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn excluding_every_slot_finds_no_curve() {
        let mut split = Split::new("s");
        for x in 1..=3 {
            split.add_run(Run::new("f", x as f64).with_arguments(Arguments::new().arg(x)));
        }
        let best = split
            .determine_best_fit(CurveSelection::Automatic, &Exclusions::new().index(0), &Transformers::None)
            .unwrap();
        assert!(best.is_none());
    }

    #[test]
    fn counts_never_drop_below_one() {
        let run = Run::new("x", 1.0).with_counts(0, 0);
        assert_eq!((run.runs, run.iterations_per_run), (1, 1));
    }
}
