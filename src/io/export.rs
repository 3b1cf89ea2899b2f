//! Export a fit report to JSON.
//!
//! The file carries the generating tool, a UTC timestamp, the time unit of
//! `predictions`, and the full report (every scored and skipped family).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::fit::FitReport;
use crate::report::TimeUnit;

/// A predicted time for one input size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub size: u64,
    pub time: f64,
}

#[derive(Debug, Serialize)]
pub struct FitExport<'a> {
    pub tool: &'static str,
    pub generated_at: DateTime<Utc>,
    pub unit: TimeUnit,
    pub report: &'a FitReport,
    pub predictions: &'a [Prediction],
}

impl<'a> FitExport<'a> {
    pub fn new(report: &'a FitReport, unit: TimeUnit, predictions: &'a [Prediction]) -> Self {
        Self {
            tool: "exectiming",
            generated_at: Utc::now(),
            unit,
            report,
            predictions,
        }
    }
}

/// Write the export as pretty JSON to any writer.
pub fn write_fit_json_to(writer: impl Write, export: &FitExport<'_>) -> Result<()> {
    serde_json::to_writer_pretty(writer, export)?;
    Ok(())
}

/// Write the export as pretty JSON to `path`.
pub fn write_fit_json(path: &Path, export: &FitExport<'_>) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_fit_json_to(&mut writer, export)?;
    writer.flush()?;
    tracing::debug!(path = %path.display(), "wrote fit export");
    Ok(())
}
