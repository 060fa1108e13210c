//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - installs the log subscriber
//! - parses CLI arguments
//! - loads the analysis configuration for commands that analyse data
//! - dispatches to the pipeline and prints summaries

use std::fs;
use std::path::Path;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::cli::{AnalyzeArgs, Cli, Command, PlotArgs, RateArgs, SimulateArgs};
use crate::data::{RunParameters, arrhenius_rate_constant, generate_run};
use crate::domain::{AnalysisConfig, ExperimentSet};
use crate::error::AppError;
use crate::io::{config_path_from_env, load_config, read_arrhenius_points, write_json, write_series_csv};
use crate::plot::{ArrheniusChart, draw_arrhenius_chart};

pub mod pipeline;

/// Entry point for the `sapk` binary.
pub fn run() -> Result<(), AppError> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze(args) => handle_analyze(&load(cli.config.as_deref())?, args),
        Command::Rate(args) => handle_rate(&load(cli.config.as_deref())?, args),
        Command::Plot(args) => handle_plot(args),
        Command::Simulate(args) => handle_simulate(args),
    }
}

/// Logs go to stderr so stdout carries only the summaries. `RUST_LOG` overrides
/// the default `info` level.
fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load(flag: Option<&Path>) -> Result<AnalysisConfig, AppError> {
    load_config(&config_path_from_env(flag))
}

fn handle_analyze(config: &AnalysisConfig, args: AnalyzeArgs) -> Result<(), AppError> {
    let experiments = ExperimentSet {
        filepaths: args.files,
        temperatures: args.conditions.temperatures,
        k_0: args.conditions.k_0,
        k_inf: args.conditions.k_inf,
        c_0: args.conditions.c_0,
    };
    let report = pipeline::compute_activation_energy(config, &experiments, &args.report)?;
    println!("{}", crate::report::format_activation_energy(&report));
    Ok(())
}

fn handle_rate(config: &AnalysisConfig, args: RateArgs) -> Result<(), AppError> {
    let record = pipeline::compute_rate_constant(config, &args.file, args.k_0, args.k_inf, args.c_0)?;
    println!("{}", crate::report::format_rate_constant(&record));

    if let Some(path) = &args.output {
        pipeline::ensure_parent_dir(path)?;
        write_json(path, &record)?;
        info!(path = %path.display(), "record written");
    }
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let points = read_arrhenius_points(&args.report)?;
    let output = args.output.unwrap_or_else(|| args.report.with_extension("svg"));
    draw_arrhenius_chart(
        &output,
        &ArrheniusChart {
            inverse_temperatures: &points.inverse_temperatures,
            log_rate_constants: &points.log_rate_constants,
            coefficients: &points.coefficients,
        },
    )?;
    println!("{}", output.display());
    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let c = &args.conditions;
    let experiments = ExperimentSet {
        filepaths: (0..c.temperatures.len())
            .map(|i| args.out_dir.join(format!("run-{i:02}-{:.2}K.csv", c.temperatures[i])))
            .collect(),
        temperatures: c.temperatures.clone(),
        k_0: c.k_0.clone(),
        k_inf: c.k_inf.clone(),
        c_0: c.c_0.clone(),
    };
    experiments.validate_shape()?;

    fs::create_dir_all(&args.out_dir)
        .map_err(|e| AppError::io(format!("failed to create '{}'", args.out_dir.display()), e))?;

    for (i, path) in experiments.filepaths.iter().enumerate() {
        let temperature = experiments.temperatures[i];
        let rate_constant =
            arrhenius_rate_constant(args.activation_energy, args.pre_exponential, temperature, args.gas_constant);
        let params = RunParameters {
            rate_constant,
            conditions: experiments.conditions(i),
            start_offset: args.start_offset,
            duration: args.duration,
            interval: args.interval,
            noise: args.noise,
            spike_probability: args.spike_prob,
            spike_size: args.spike_size,
            transient_points: args.transient_points,
            transient_depth: args.transient_depth,
        };
        let series = generate_run(&params, args.seed.wrapping_add(i as u64))?;
        write_series_csv(path, &series)?;
        info!(path = %path.display(), temperature, rate_constant, points = series.len(), "dataset written");
    }

    println!("{}", analyze_invocation(&experiments));
    Ok(())
}

/// The `sapk analyze` command line that analyses the generated files.
fn analyze_invocation(experiments: &ExperimentSet) -> String {
    let join = |values: &[f64]| values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(",");
    let files: Vec<String> = experiments
        .filepaths
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    format!(
        "sapk analyze --files {} --temperatures {} --k0 {} --k-inf {} --c0 {}",
        files.join(" "),
        join(&experiments.temperatures),
        join(&experiments.k_0),
        join(&experiments.k_inf),
        join(&experiments.c_0),
    )
}
