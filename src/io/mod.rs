//! Input/output helpers.
//!
//! - fit report export (JSON) (`export`)

pub mod export;

pub use export::*;
