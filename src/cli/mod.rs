//! Command-line parsing for the saponification kinetics analyser.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! fitting code; dispatch lives in `app`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "sapk",
    version,
    about = "Rate constants and activation energy from saponification conductivity data"
)]
pub struct Cli {
    /// Configuration file (default: $SAPK_CONFIG, then ./config.json).
    #[arg(long, global = true, value_name = "JSON")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rate constants for several temperatures, then the activation energy.
    ///
    /// Writes `<report>.json` and the Arrhenius chart `<report>.svg`.
    Analyze(AnalyzeArgs),
    /// Rate constant of a single dataset.
    Rate(RateArgs),
    /// Redraw the Arrhenius chart of a saved report.
    Plot(PlotArgs),
    /// Write synthetic datasets whose rate constants follow Arrhenius' law.
    Simulate(SimulateArgs),
}

/// Per-dataset constants shared by `analyze` and `simulate`, one value per dataset.
#[derive(Debug, Args, Clone)]
pub struct ConditionArgs {
    /// Temperatures in Kelvin.
    #[arg(long, num_args = 1.., required = true, value_delimiter = ',')]
    pub temperatures: Vec<f64>,

    /// Initial conductivities.
    #[arg(long = "k0", num_args = 1.., required = true, value_delimiter = ',')]
    pub k_0: Vec<f64>,

    /// Final conductivities.
    #[arg(long = "k-inf", num_args = 1.., required = true, value_delimiter = ',')]
    pub k_inf: Vec<f64>,

    /// Initial concentrations (mol/L).
    #[arg(long = "c0", num_args = 1.., required = true, value_delimiter = ',')]
    pub c_0: Vec<f64>,
}

#[derive(Debug, Args, Clone)]
pub struct AnalyzeArgs {
    /// Dataset files (.xlsx, .xls, .ods or .csv), in the same order as the constants.
    #[arg(long, num_args = 1.., required = true)]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub conditions: ConditionArgs,

    /// Output name without extension.
    #[arg(long, default_value = "report")]
    pub report: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct RateArgs {
    #[arg(long)]
    pub file: PathBuf,

    #[arg(long = "k0")]
    pub k_0: f64,

    #[arg(long = "k-inf")]
    pub k_inf: f64,

    #[arg(long = "c0")]
    pub c_0: f64,

    /// Also write the full record as JSON.
    #[arg(long, value_name = "JSON")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Report JSON written by `sapk analyze`.
    #[arg(long, value_name = "JSON")]
    pub report: PathBuf,

    /// Chart path (default: the report path with an `.svg` extension).
    #[arg(long, value_name = "SVG")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SimulateArgs {
    /// Directory for the generated CSV files (created if missing).
    #[arg(long)]
    pub out_dir: PathBuf,

    #[command(flatten)]
    pub conditions: ConditionArgs,

    /// True activation energy (kJ/mol).
    #[arg(long, default_value_t = 45.0)]
    pub activation_energy: f64,

    /// Pre-exponential factor A in L/(mol·s).
    #[arg(long, default_value_t = 8.0e6)]
    pub pre_exponential: f64,

    /// Molar gas constant in J/(mol·K).
    #[arg(long, default_value_t = 8.314)]
    pub gas_constant: f64,

    /// Run length in seconds.
    #[arg(long, default_value_t = 1200.0)]
    pub duration: f64,

    /// Seconds between readings.
    #[arg(long, default_value_t = 6.0)]
    pub interval: f64,

    /// Seconds between reaction start and the first reading.
    #[arg(long, default_value_t = 30.0)]
    pub start_offset: f64,

    /// Standard deviation of measurement noise.
    #[arg(long, default_value_t = 0.3)]
    pub noise: f64,

    /// Probability that a reading is a spike.
    #[arg(long, default_value_t = 0.01)]
    pub spike_prob: f64,

    /// Magnitude of a spike.
    #[arg(long, default_value_t = 60.0)]
    pub spike_size: f64,

    /// Number of readings disturbed by mixing.
    #[arg(long, default_value_t = 4)]
    pub transient_points: usize,

    #[arg(long, default_value_t = 150.0)]
    pub transient_depth: f64,

    /// Random seed; dataset `i` uses `seed + i`.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
