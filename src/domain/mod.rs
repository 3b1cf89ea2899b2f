//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - call arguments (`Value`, `ArgKey`, `Arguments`)
//! - measurement records (`Run`, `Split`)
//! - regression inputs (`Point`, `PointSet`)
//! - curve families and fitted results (`CurveKind`, `Parameters`, `FittedCurve`)

pub mod point;
pub mod run;
pub mod types;

pub use point::*;
pub use run::*;
pub use types::*;
