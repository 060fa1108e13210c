//! Terminal output for rate-constant records and activation-energy reports.

pub mod format;

pub use format::*;
