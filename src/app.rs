//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and installs logging
//! - parses CLI arguments into a validated `RunConfig`
//! - runs the timing pipeline
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, RunArgs};
use crate::error::Result;
use crate::models::CurveRegistry;

pub mod pipeline;
pub mod workload;

pub use pipeline::{RunConfig, RunOutput, run_timing, run_timing_with_clock, sizes_in_range};
pub use workload::Workload;

/// Entry point for the `exectiming` binary.
pub fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    // `exectiming` and `exectiming -w pairs` behave like `exectiming run ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Curves => handle_curves(),
    }
}

fn handle_run(args: RunArgs) -> Result<()> {
    init_tracing(args.debug);
    let config = run_config_from_args(&args)?;
    let output = run_timing(&config)?;

    if config.list_runs {
        print!("{}", crate::report::format_splits(
            output.timer.splits(),
            config.unit,
            &crate::report::SplitTransformers::new(),
        ));
    }
    print!("{}", crate::report::format_statistics(output.timer.splits(), config.unit));
    println!("{}", crate::report::format_fit_report(&output.report, config.rounding));

    if config.plot {
        let curve = output.report.best.as_ref().map(|b| &b.curve);
        match crate::plot::render_ascii_plot(
            &output.points,
            curve,
            config.unit,
            config.plot_width,
            config.plot_height,
        ) {
            Some(plot) => println!("{plot}"),
            None => tracing::info!("plot skipped: samples are not single-argument"),
        }
    }

    if !output.predictions.is_empty() {
        println!("Predictions:");
        for p in &output.predictions {
            println!("  n={:<12} {} {}", p.size, p.time, config.unit);
        }
    }

    if let Some(path) = &config.export_fit {
        let export = crate::io::FitExport::new(&output.report, config.unit, &output.predictions);
        crate::io::write_fit_json(path, &export)?;
    }

    Ok(())
}

fn handle_curves() -> Result<()> {
    for (i, model) in CurveRegistry::default().iter().enumerate() {
        println!("{}. {}", i + 1, model.kind());
    }
    Ok(())
}

/// Stderr logging filtered by `RUST_LOG` (default `warn`); `--debug` forces `debug`.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run_config_from_args(args: &RunArgs) -> Result<RunConfig> {
    let sizes = if args.sizes.is_empty() {
        sizes_in_range(args.min_size, args.max_size, args.steps)?
    } else {
        args.sizes.clone()
    };

    let config = RunConfig {
        workload: args.workload,
        sizes,
        runs: args.runs,
        iterations: args.iterations,
        seed: args.seed,
        selection: args.curve,
        unit: args.unit,
        rounding: args.rounding,
        predict: args.predict.clone(),
        list_runs: args.list_runs,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_fit: args.export_fit.clone(),
    };
    config.validate()?;
    Ok(config)
}

/// Rewrite argv so `exectiming` defaults to `exectiming run`.
///
/// Rules:
/// - `exectiming`                      -> `exectiming run`
/// - `exectiming -w sum ...`           -> `exectiming run -w sum ...`
/// - `exectiming --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::error::Error;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    fn run_args(args: &[&str]) -> RunArgs {
        match Cli::parse_from(rewrite_args(argv(args))).command {
            Command::Run(args) => args,
            Command::Curves => panic!("expected run"),
        }
    }

    #[test]
    fn bare_invocation_runs() {
        assert_eq!(rewrite_args(argv(&["exectiming"])), argv(&["exectiming", "run"]));
        assert_eq!(
            rewrite_args(argv(&["exectiming", "-w", "sum"])),
            argv(&["exectiming", "run", "-w", "sum"])
        );
        assert_eq!(rewrite_args(argv(&["exectiming", "--help"])), argv(&["exectiming", "--help"]));
        assert_eq!(rewrite_args(argv(&["exectiming", "curves"])), argv(&["exectiming", "curves"]));
    }

    #[test]
    fn config_uses_range_unless_sizes_given() {
        let config = run_config_from_args(&run_args(&[
            "exectiming", "--min-size", "100", "--max-size", "400", "--steps", "4", "--no-plot",
        ]))
        .unwrap();
        assert_eq!(config.sizes, [100, 200, 300, 400]);
        assert!(!config.plot);

        let config = run_config_from_args(&run_args(&["exectiming", "--sizes", "5,50,500"])).unwrap();
        assert_eq!(config.sizes, [5, 50, 500]);
        assert!(config.plot);
    }

    #[test]
    fn invalid_config_is_reported() {
        let err = run_config_from_args(&run_args(&["exectiming", "--runs", "0"])).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert_eq!(err.exit_code(), 2);
    }
}
