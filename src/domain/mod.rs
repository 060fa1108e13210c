//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the measured `Series` and the per-run `ReactionConditions`
//! - fit outputs (`FitResult`, `RateConstantRecord`, `ActivationEnergyReport`)
//! - the analysis configuration (`AnalysisConfig`)

pub mod types;

pub use types::*;
