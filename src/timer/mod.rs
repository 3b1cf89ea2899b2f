//! Timing session: measures code and accumulates `Run`s into `Split`s.
//!
//! A `Timer` owns an ordered list of splits. New measurements always go into the
//! latest split; fitting can address any split by position or label.

use std::time::Instant;

use crate::domain::{Arguments, CurveSelection, FittedCurve, Run, Split};
use crate::error::{Error, Result};
use crate::fit::{Exclusions, FitReport, Transformers};
use crate::models::CurveRegistry;

/// Source of elapsed time in fractional seconds.
pub trait Clock {
    fn now(&self) -> f64;
}

/// `Instant`-backed monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Addresses one split of a timer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SplitRef {
    #[default]
    Latest,
    Index(usize),
    Label(String),
}

impl From<usize> for SplitRef {
    fn from(index: usize) -> Self {
        SplitRef::Index(index)
    }
}

impl From<&str> for SplitRef {
    fn from(label: &str) -> Self {
        SplitRef::Label(label.to_string())
    }
}

/// Options for [`Timer::time_it`].
#[derive(Debug, Clone)]
pub struct TimeOptions {
    pub runs: u32,
    pub iterations_per_run: u32,
    /// Store the call arguments on every run (needed for curve fitting).
    pub log_arguments: bool,
    /// Start a new split before measuring; otherwise append to the latest one.
    pub new_split: bool,
    /// Label for the new split (defaults to the measurement label).
    pub split_label: Option<String>,
}

impl Default for TimeOptions {
    fn default() -> Self {
        Self {
            runs: 1,
            iterations_per_run: 1,
            log_arguments: false,
            new_split: true,
            split_label: None,
        }
    }
}

/// Options for [`Timer::log`].
#[derive(Debug, Clone)]
pub struct LogOptions {
    pub label: String,
    pub runs: u32,
    pub iterations_per_run: u32,
    /// Restart the elapsed-time base point after logging.
    pub reset: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            label: "Log".to_string(),
            runs: 1,
            iterations_per_run: 1,
            reset: true,
        }
    }
}

#[derive(Debug)]
pub struct Timer<C: Clock = MonotonicClock> {
    clock: C,
    splits: Vec<Split>,
    base_point: Option<f64>,
}

impl Default for Timer<MonotonicClock> {
    fn default() -> Self {
        Self::with_clock(MonotonicClock::default())
    }
}

impl Timer<MonotonicClock> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock> Timer<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            splits: Vec::new(),
            base_point: None,
        }
    }

    pub fn splits(&self) -> &[Split] {
        &self.splits
    }

    /// Start a new split; subsequent measurements are appended to it.
    pub fn split(&mut self, label: impl Into<String>) -> &mut Split {
        self.splits.push(Split::new(label));
        let last = self.splits.len() - 1;
        &mut self.splits[last]
    }

    pub fn get(&self, split: &SplitRef) -> Result<&Split> {
        match split {
            SplitRef::Latest => self.splits.last().ok_or(Error::NoSplit),
            SplitRef::Index(i) => self
                .splits
                .get(*i)
                .ok_or_else(|| Error::SplitNotFound(i.to_string())),
            SplitRef::Label(label) => self
                .splits
                .iter()
                .find(|s| s.label() == label)
                .ok_or_else(|| Error::SplitNotFound(label.clone())),
        }
    }

    /// Set the base point for [`Timer::log`].
    pub fn start(&mut self) {
        self.base_point = Some(self.clock.now());
    }

    /// Record the time since the last `start` (or resetting `log`) as a run in
    /// the latest split. Returns the elapsed seconds.
    pub fn log(&mut self, arguments: Arguments, options: &LogOptions) -> Result<f64> {
        let base = self.base_point.ok_or(Error::NotStarted)?;
        let now = self.clock.now();
        let split = self.splits.last_mut().ok_or(Error::NoSplit)?;

        let elapsed = now - base;
        split.add_run(
            Run::new(options.label.clone(), elapsed)
                .with_counts(options.runs, options.iterations_per_run)
                .with_arguments(arguments),
        );
        if options.reset {
            self.base_point = Some(now);
        }
        Ok(elapsed)
    }

    /// Time `f(&arguments)`: `runs` runs of `iterations_per_run` calls each, one
    /// `Run` per run. Returns the value of the last call.
    pub fn time_it<T>(
        &mut self,
        label: &str,
        arguments: Arguments,
        options: &TimeOptions,
        f: impl FnMut(&Arguments) -> T,
    ) -> Result<T> {
        self.time_it_with(label, options, || arguments.clone(), f)
    }

    /// Like [`Timer::time_it`], but `make_arguments` builds fresh arguments
    /// before every run (outside the measured interval). Each run calls `f`
    /// with, and logs, the arguments built for it.
    pub fn time_it_with<T>(
        &mut self,
        label: &str,
        options: &TimeOptions,
        mut make_arguments: impl FnMut() -> Arguments,
        mut f: impl FnMut(&Arguments) -> T,
    ) -> Result<T> {
        if options.new_split {
            self.split(options.split_label.as_deref().unwrap_or(label));
        } else if self.splits.is_empty() {
            return Err(Error::NoSplit);
        }

        let runs = options.runs.max(1);
        let iterations = options.iterations_per_run.max(1);

        let mut value = self.measure(label, iterations, make_arguments(), options.log_arguments, &mut f);
        for _ in 1..runs {
            value = self.measure(label, iterations, make_arguments(), options.log_arguments, &mut f);
        }
        Ok(value)
    }

    /// One run: `iterations` calls, appended to the latest split.
    fn measure<T>(
        &mut self,
        label: &str,
        iterations: u32,
        arguments: Arguments,
        log_arguments: bool,
        f: &mut impl FnMut(&Arguments) -> T,
    ) -> T {
        let start = self.clock.now();
        let mut value = f(&arguments);
        for _ in 1..iterations {
            value = f(&arguments);
        }
        let elapsed = self.clock.now() - start;

        let logged = if log_arguments { arguments } else { Arguments::default() };
        if let Some(split) = self.splits.last_mut() {
            split.add_run(
                Run::new(label, elapsed)
                    .with_counts(1, iterations)
                    .with_arguments(logged),
            );
        }
        value
    }

    /// Best fit curve for one split.
    pub fn best_fit_curve(
        &self,
        split: &SplitRef,
        selection: CurveSelection,
        exclude: &Exclusions,
        transformers: &Transformers,
    ) -> Result<Option<FittedCurve>> {
        self.get(split)?.determine_best_fit(selection, exclude, transformers)
    }

    /// Full fit diagnostics for one split.
    pub fn evaluate_curves(
        &self,
        split: &SplitRef,
        registry: &CurveRegistry,
        selection: CurveSelection,
        exclude: &Exclusions,
        transformers: &Transformers,
    ) -> Result<FitReport> {
        self.get(split)?
            .evaluate_curves(registry, selection, exclude, transformers)
    }
}
