//! Command-line parsing for the execution-time curve fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the timing/fitting code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::app::Workload;
use crate::domain::CurveSelection;
use crate::report::TimeUnit;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "exectiming",
    version,
    about = "Time code across input sizes and fit a growth curve to the measurements"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Time a built-in workload across input sizes, fit curves and report.
    Run(RunArgs),
    /// List the registered curve families in selection order.
    Curves,
}

/// Options for timing and fitting.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Workload to time.
    #[arg(short = 'w', long, value_enum, default_value_t = Workload::Sort)]
    pub workload: Workload,

    /// Explicit input sizes (comma separated). Overrides the size range.
    #[arg(long, value_delimiter = ',')]
    pub sizes: Vec<u64>,

    /// Smallest input size of the range.
    #[arg(long, default_value_t = 1_000)]
    pub min_size: u64,

    /// Largest input size of the range.
    #[arg(long, default_value_t = 20_000)]
    pub max_size: u64,

    /// Number of evenly spaced sizes in the range.
    #[arg(long, default_value_t = 8)]
    pub steps: usize,

    /// Timed runs per size (one sample each).
    #[arg(short = 'r', long, default_value_t = 3)]
    pub runs: u32,

    /// Calls per run.
    #[arg(short = 'i', long, default_value_t = 1)]
    pub iterations: u32,

    /// Random seed for workload input data.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Curve family to fit (`any` picks the lowest score).
    #[arg(short = 'c', long, default_value = "any")]
    pub curve: CurveSelection,

    /// Unit for reported times.
    #[arg(short = 'u', long, value_enum, default_value_t = TimeUnit::Milliseconds)]
    pub unit: TimeUnit,

    /// Decimal places in rendered equations.
    #[arg(long, default_value_t = 5)]
    pub rounding: u32,

    /// Predict the time for these input sizes with the chosen curve.
    #[arg(short = 'p', long = "predict", value_delimiter = ',')]
    pub predict: Vec<u64>,

    /// List every timed run.
    #[arg(long)]
    pub list_runs: bool,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the fit report (every family, scores, predictions) to JSON.
    #[arg(long = "export-fit")]
    pub export_fit: Option<PathBuf>,

    /// Verbose logging (overrides RUST_LOG).
    #[arg(long)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CurveKind;

    #[test]
    fn run_defaults() {
        let cli = Cli::parse_from(["exectiming", "run"]);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.workload, Workload::Sort);
        assert_eq!(args.curve, CurveSelection::Automatic);
        assert_eq!(args.unit, TimeUnit::Milliseconds);
        assert!(args.sizes.is_empty());
        assert!(args.plot && !args.no_plot);
    }

    #[test]
    fn run_parses_lists_and_curve_names() {
        let cli = Cli::parse_from([
            "exectiming", "run", "-w", "pairs", "--sizes", "10,20,40", "--curve", "Polynomial", "-u", "us",
            "--predict", "80,160",
        ]);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.workload, Workload::Pairs);
        assert_eq!(args.sizes, [10, 20, 40]);
        assert_eq!(args.curve, CurveSelection::Family(CurveKind::Polynomial));
        assert_eq!(args.unit, TimeUnit::Microseconds);
        assert_eq!(args.predict, [80, 160]);
    }

    #[test]
    fn unknown_curve_is_rejected() {
        assert!(Cli::try_parse_from(["exectiming", "run", "--curve", "Cubic"]).is_err());
    }
}
