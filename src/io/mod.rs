//! Input/output helpers.
//!
//! - configuration loading + validation (`config`)
//! - dataset ingest from spreadsheets and CSV, CSV dataset export (`dataset`)
//! - JSON report read/write (`report`)

pub mod config;
pub mod dataset;
pub mod report;

pub use config::*;
pub use dataset::*;
pub use report::*;
