//! `exectiming` library crate.
//!
//! Measure how long code takes across varying inputs, group the measurements
//! into splits, and infer which growth curve (exponential, linear, logarithmic,
//! quadratic polynomial) best predicts the time from the inputs.
//!
//! The binary (`exectiming`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the timer and fitter can be embedded directly in other programs

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod timer;
