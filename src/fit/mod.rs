//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - project logged arguments into feature vectors (exclusions, transformers)
//! - fit every applicable curve family
//! - select the family with the lowest absolute-residual score

pub mod projector;
pub mod selection;

pub use projector::*;
pub use selection::*;
