//! `saponification-kinetics` library crate.
//!
//! Estimates second-order rate constants of ester saponification from
//! conductivity–time data, and the activation energy from rate constants at
//! several temperatures.
//!
//! The binary (`sapk`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the numeric stages (`fit`, `math`) stay free of file and terminal I/O

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
