//! Formatted terminal output: run listings, statistics and fit diagnostics.
//!
//! We keep formatting code in one place so:
//! - the timing and fitting code stays clean and testable
//! - output changes are localized (the layouts are pinned by tests below)

use std::collections::HashMap;

use crate::domain::{Run, Split};
use crate::fit::{FitReport, Transformers};
use crate::report::TimeUnit;

/// Default indent for runs listed under their split.
pub const INDENT: &str = "    ";

/// Characters of argument text kept in a run's name column.
const ARGUMENT_PREVIEW: usize = 25;

/// One measurement line:
/// `<time> <unit> - <name>[(args)] [runs=<runs>, iterations=<iterations>] [| message]`.
pub fn format_run(run: &Run, unit: TimeUnit, message: &str) -> String {
    format_run_with(run, &Transformers::None, unit, message)
}

/// [`format_run`] with the argument text passed through `transformers` first.
pub fn format_run_with(run: &Run, transformers: &Transformers, unit: TimeUnit, message: &str) -> String {
    let arguments = match transformers {
        Transformers::None => run.arguments.to_string(),
        _ => transformers.apply(&run.arguments).to_string(),
    };
    format_line(
        &run.label,
        &arguments,
        run.runs,
        run.iterations_per_run,
        run.time,
        unit,
        message,
    )
}

fn format_line(
    label: &str,
    arguments: &str,
    runs: u32,
    iterations: u32,
    seconds: f64,
    unit: TimeUnit,
    message: &str,
) -> String {
    let name = if arguments.is_empty() {
        label.to_string()
    } else {
        format!("{label}({})", truncate(arguments, ARGUMENT_PREVIEW))
    };
    let message = if message.is_empty() {
        String::new()
    } else {
        format!("| {message}")
    };
    format!(
        "{:>10.5} {:2} - {:42.42} [runs={:3}, iterations={:3}] {:<20.20}",
        unit.convert(seconds),
        unit.label(),
        name,
        runs,
        iterations,
        message
    )
}

/// Display-only argument transformers, chosen per split by index or label.
///
/// An index entry wins over a label entry for the same split.
#[derive(Debug, Default)]
pub struct SplitTransformers {
    by_index: HashMap<usize, Transformers>,
    by_label: HashMap<String, Transformers>,
}

impl SplitTransformers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(mut self, index: usize, transformers: Transformers) -> Self {
        self.by_index.insert(index, transformers);
        self
    }

    pub fn label(mut self, label: impl Into<String>, transformers: Transformers) -> Self {
        self.by_label.insert(label.into(), transformers);
        self
    }

    fn for_split(&self, index: usize, label: &str) -> &Transformers {
        static NONE: Transformers = Transformers::None;
        self.by_index
            .get(&index)
            .or_else(|| self.by_label.get(label))
            .unwrap_or(&NONE)
    }
}

/// Every non-empty split with its runs listed underneath.
///
/// `transformers` only change how arguments are shown; the runs are untouched.
pub fn format_splits(splits: &[Split], unit: TimeUnit, transformers: &SplitTransformers) -> String {
    let mut out = String::new();
    for (i, split) in splits.iter().enumerate().filter(|(_, s)| !s.is_empty()) {
        let display = transformers.for_split(i, split.label());
        out.push_str(&format!("{}:\n", split.label()));
        for run in split.runs() {
            out.push_str(INDENT);
            out.push_str(&format_run_with(run, display, unit, ""));
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

/// Runs, total, average, standard deviation and variance of every non-empty split.
pub fn format_statistics(splits: &[Split], unit: TimeUnit) -> String {
    let mut out = String::new();
    for split in splits.iter().filter(|s| !s.is_empty()) {
        let stats = split.stats();
        out.push_str(&format!("{}:\n", split.label()));
        out.push_str(&format!("{INDENT}{:<20}{}\n", "Runs", stats.runs));
        for (name, seconds) in [
            ("Total Time", stats.total),
            ("Average", stats.average),
            ("Standard Deviation", stats.standard_deviation),
            ("Variance", stats.variance),
        ] {
            out.push_str(&format!("{INDENT}{name:<20}{} {unit}\n", unit.convert(seconds)));
        }
        out.push('\n');
    }
    out
}

/// Per-family scores, skipped families and the chosen curve.
pub fn format_fit_report(report: &FitReport, rounding: u32) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Curve diagnostics: {} (n={}, features=[{}])\n",
        report.label,
        report.samples,
        report.features.join(", ")
    ));

    let chosen_kind = report.best.as_ref().map(|b| b.curve.kind);
    for fit in &report.fits {
        let chosen = if Some(fit.curve.kind) == chosen_kind { "*" } else { " " };
        out.push_str(&format!(
            "{chosen} {:<12} score={:.6e}  {}\n",
            fit.curve.kind.name(),
            fit.score,
            fit.curve.equation(rounding)
        ));
    }
    for skipped in &report.skipped {
        out.push_str(&format!("  (skipped {}) {}\n", skipped.kind, skipped.reason));
    }

    out.push_str("\nChosen curve:\n");
    match &report.best {
        Some(best) => {
            out.push_str(&format!("- {}\n", best.curve.kind));
            out.push_str(&format!("- {}\n", best.curve.equation(rounding)));
            let params: Vec<String> = best
                .curve
                .parameters
                .iter()
                .map(|(k, v)| format!("{k}={v:.6e}"))
                .collect();
            out.push_str(&format!("- parameters: {}\n", params.join(", ")));
        }
        None => out.push_str("- none (no curve family applies to these arguments)\n"),
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
