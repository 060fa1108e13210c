//! Calibration and regression stages.
//!
//! Responsibilities, leaf to root:
//!
//! - reject outliers from a raw series (`outlier`)
//! - fit the rational conductivity curve with leading-point trimming (`calibration`)
//! - differentiate the calibrated curve through a spline (`derivative`)
//! - derive the rate constant from the derivative line (`rate`)
//! - derive the activation energy from several rate constants (`arrhenius`)

pub mod arrhenius;
pub mod calibration;
pub mod derivative;
pub mod fitter;
pub mod outlier;
pub mod rate;

pub use arrhenius::*;
pub use calibration::*;
pub use derivative::*;
pub use fitter::*;
pub use outlier::*;
pub use rate::*;
