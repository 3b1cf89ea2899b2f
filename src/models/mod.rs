//! Curve family implementations.
//!
//! Each family is a unit struct implementing [`CurveModel`]; the ordered
//! [`CurveRegistry`] is what selection iterates.

pub mod curves;
pub mod model;
pub mod registry;

pub use curves::*;
pub use model::*;
pub use registry::*;
