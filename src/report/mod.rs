//! Reporting utilities: time units and formatted terminal output.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub mod format;

pub use format::*;

/// Decimal places kept when converting measured times for display.
pub const TIME_ROUNDING: u32 = 5;

/// Display unit for measured times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum TimeUnit {
    #[value(name = "s")]
    #[serde(rename = "s")]
    Seconds,
    #[default]
    #[value(name = "ms")]
    #[serde(rename = "ms")]
    Milliseconds,
    #[value(name = "us")]
    #[serde(rename = "us")]
    Microseconds,
    #[value(name = "ns")]
    #[serde(rename = "ns")]
    Nanoseconds,
}

impl TimeUnit {
    pub fn label(self) -> &'static str {
        match self {
            TimeUnit::Seconds => "s",
            TimeUnit::Milliseconds => "ms",
            TimeUnit::Microseconds => "us",
            TimeUnit::Nanoseconds => "ns",
        }
    }

    pub fn per_second(self) -> f64 {
        match self {
            TimeUnit::Seconds => 1.0,
            TimeUnit::Milliseconds => 1e3,
            TimeUnit::Microseconds => 1e6,
            TimeUnit::Nanoseconds => 1e9,
        }
    }

    /// Convert seconds to this unit, rounded to [`TIME_ROUNDING`] places.
    pub fn convert(self, seconds: f64) -> f64 {
        let factor = 10f64.powi(TIME_ROUNDING as i32);
        (seconds * self.per_second() * factor).round() / factor
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
