//! Numerical building blocks: least squares, Levenberg–Marquardt, splines, statistics.

pub mod lm;
pub mod ols;
pub mod spline;
pub mod stats;

pub use lm::*;
pub use ols::*;
pub use spline::*;
pub use stats::*;
