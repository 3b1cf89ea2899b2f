//! Shared "timing pipeline": inputs -> timed runs -> curve selection -> predictions.
//!
//! Keeping this in one place lets the CLI focus on presentation (printing,
//! plotting, exports) and lets tests drive the whole flow with a fake clock.

use std::path::PathBuf;

use crate::app::Workload;
use crate::domain::{Arguments, CurveSelection, PointSet};
use crate::error::{Error, Result};
use crate::fit::{ArgumentProjector, Exclusions, FitReport, Transformers};
use crate::io::Prediction;
use crate::models::CurveRegistry;
use crate::report::TimeUnit;
use crate::timer::{Clock, MonotonicClock, SplitRef, TimeOptions, Timer};

/// Validated settings for one `exectiming run`.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub workload: Workload,
    pub sizes: Vec<u64>,
    pub runs: u32,
    pub iterations: u32,
    pub seed: u64,
    pub selection: CurveSelection,
    pub unit: TimeUnit,
    pub rounding: u32,
    pub predict: Vec<u64>,
    pub list_runs: bool,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export_fit: Option<PathBuf>,
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        let mut distinct = self.sizes.clone();
        distinct.sort_unstable();
        distinct.dedup();
        if distinct.len() < 2 {
            return Err(Error::InvalidConfig(
                "at least two distinct input sizes are required".to_string(),
            ));
        }
        if distinct[0] == 0 {
            return Err(Error::InvalidConfig("input sizes must be positive".to_string()));
        }
        if self.runs == 0 || self.iterations == 0 {
            return Err(Error::InvalidConfig("runs and iterations must be at least 1".to_string()));
        }
        if self.rounding > 15 {
            return Err(Error::InvalidConfig("rounding must be at most 15 digits".to_string()));
        }
        if self.plot && (self.plot_width < 10 || self.plot_height < 5) {
            return Err(Error::InvalidConfig("plot must be at least 10x5".to_string()));
        }
        Ok(())
    }
}

/// `steps` evenly spaced sizes from `min` to `max` (inclusive, deduplicated).
pub fn sizes_in_range(min: u64, max: u64, steps: usize) -> Result<Vec<u64>> {
    if min == 0 || max <= min {
        return Err(Error::InvalidConfig(format!(
            "size range must satisfy 0 < min < max (got {min}..{max})"
        )));
    }
    if steps < 2 {
        return Err(Error::InvalidConfig("steps must be at least 2".to_string()));
    }

    let span = (max - min) as f64;
    let mut sizes: Vec<u64> = (0..steps)
        .map(|i| min + (span * i as f64 / (steps - 1) as f64).round() as u64)
        .collect();
    sizes.dedup();
    Ok(sizes)
}

/// All computed outputs of a single run.
#[derive(Debug)]
pub struct RunOutput<C: Clock = MonotonicClock> {
    pub timer: Timer<C>,
    pub points: PointSet,
    pub report: FitReport,
    /// Predicted times in `RunConfig::unit`.
    pub predictions: Vec<Prediction>,
}

/// Execute the pipeline with the monotonic clock.
pub fn run_timing(config: &RunConfig) -> Result<RunOutput> {
    run_timing_with_clock(config, MonotonicClock::default())
}

/// Execute the pipeline with a caller-supplied clock.
pub fn run_timing_with_clock<C: Clock>(config: &RunConfig, clock: C) -> Result<RunOutput<C>> {
    config.validate()?;

    // 1) Time the workload at every size into one split.
    let mut timer = Timer::with_clock(clock);
    timer.split(config.workload.name());
    let options = TimeOptions {
        runs: config.runs,
        iterations_per_run: config.iterations,
        log_arguments: true,
        new_split: false,
        split_label: None,
    };
    for &size in &config.sizes {
        let data = config.workload.input(size, config.seed);
        timer.time_it(config.workload.name(), Arguments::new().arg(size), &options, |_| {
            config.workload.execute(&data)
        })?;
        tracing::debug!(size, "timed workload");
    }

    // 2) Fit and select.
    let registry = CurveRegistry::default();
    let exclude = Exclusions::new();
    let transformers = Transformers::None;
    let report = timer.evaluate_curves(&SplitRef::Latest, &registry, config.selection, &exclude, &transformers)?;
    let points = ArgumentProjector::new(&exclude, &transformers).point_set(timer.get(&SplitRef::Latest)?.runs())?;

    // 3) Predictions with the chosen curve.
    let mut predictions = Vec::with_capacity(config.predict.len());
    if let Some(best) = &report.best {
        for &size in &config.predict {
            let seconds = best.curve.predict(&Arguments::new().arg(size))?;
            predictions.push(Prediction {
                size,
                time: config.unit.convert(seconds),
            });
        }
    } else if !config.predict.is_empty() {
        tracing::warn!("no curve was selected; skipping predictions");
    }

    Ok(RunOutput {
        timer,
        points,
        report,
        predictions,
    })
}
