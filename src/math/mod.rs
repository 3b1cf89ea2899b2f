//! Numeric building blocks: least squares, Levenberg–Marquardt, polynomial basis.

pub mod basis;
pub mod nlls;
pub mod ols;

pub use basis::*;
pub use nlls::*;
pub use ols::*;
