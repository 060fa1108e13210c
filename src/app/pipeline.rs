//! Analysis entry points shared by the CLI commands and the integration tests.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load dataset -> calibrate -> differentiate -> rate constant, and for several
//! datasets: fan out -> Arrhenius fit -> JSON report + chart.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{Span, error, info, info_span};

use crate::domain::{ActivationEnergyReport, AnalysisConfig, ExperimentSet, RateConstantRecord, ReactionConditions};
use crate::error::AppError;
use crate::fit::{estimate_activation_energy, rate_constant_from_series};
use crate::io::{load_series, write_json};
use crate::plot::{ArrheniusChart, draw_arrhenius_chart};

/// Analyse one dataset.
pub fn compute_rate_constant(
    config: &AnalysisConfig,
    path: &Path,
    k_0: f64,
    k_inf: f64,
    c_0: f64,
) -> Result<RateConstantRecord, AppError> {
    let dataset = path.display().to_string();
    let _span = info_span!("rate_constant", dataset = %dataset).entered();

    let conditions = ReactionConditions { k_0, k_inf, c_0 };
    conditions
        .validate()
        .map_err(|msg| AppError::InvalidArgument(format!("{dataset}: {msg}")))?;

    let raw = load_series(path, config)?;
    info!(points = raw.len(), "analysing data");
    let record =
        rate_constant_from_series(&dataset, &raw, conditions, config).map_err(|e| AppError::numeric(&dataset, e))?;

    info!(
        rate_constant = record.rate_constant.value,
        standard_deviation = record.rate_constant.standard_deviation,
        calibration_r_squared = record.calibration_fit.r_squared,
        derivative_r_squared = record.derivative_fit.r_squared,
        cycles = record.diagnostics.calibration_cycles,
        "rate constant estimated"
    );
    Ok(record)
}

/// Analyse every dataset of `experiments`, fit the Arrhenius line and write
/// `<report_name>.json` and `<report_name>.svg`.
///
/// Nothing is written unless every dataset succeeds.
pub fn compute_activation_energy(
    config: &AnalysisConfig,
    experiments: &ExperimentSet,
    report_name: &Path,
) -> Result<ActivationEnergyReport, AppError> {
    let _span = info_span!("activation_energy", report = %report_name.display()).entered();

    if let Err(err) = experiments.validate_shape() {
        error!(%err, "no report produced");
        return Err(err);
    }
    validate_experiments(experiments)?;

    // Every dataset runs to completion so the error reported is the first
    // failure in input order, not whichever worker failed first.
    let parent = Span::current();
    let outcomes: Vec<Result<RateConstantRecord, AppError>> = (0..experiments.len())
        .into_par_iter()
        .map(|i| {
            parent.in_scope(|| {
                let c = experiments.conditions(i);
                compute_rate_constant(config, &experiments.filepaths[i], c.k_0, c.k_inf, c.c_0)
            })
        })
        .collect();
    let records = outcomes.into_iter().collect::<Result<Vec<_>, _>>()?;

    info!(datasets = records.len(), "calculating activation energy");
    let report = estimate_activation_energy(config, &experiments.temperatures, records)
        .map_err(|e| AppError::numeric(report_name.display().to_string(), e))?;

    let (json_path, svg_path) = report_paths(report_name);
    ensure_parent_dir(&json_path)?;
    // Chart first: a failed drawing must not leave a report behind.
    let fit = &report.arrhenius_fit;
    draw_arrhenius_chart(
        &svg_path,
        &ArrheniusChart {
            inverse_temperatures: &fit.inverse_temperatures,
            log_rate_constants: &fit.log_rate_constants,
            coefficients: &fit.coefficients,
        },
    )?;
    write_json(&json_path, &report)?;

    info!(
        activation_energy = report.activation_energy,
        standard_deviation = report.standard_deviation,
        r_squared = report.r_squared,
        "activation energy estimated (kJ/mol)"
    );
    info!(json = %json_path.display(), svg = %svg_path.display(), "report written");
    Ok(report)
}

/// `<name>.json` and `<name>.svg`; an existing dot in `name` is kept.
pub fn report_paths(report_name: &Path) -> (PathBuf, PathBuf) {
    let with = |ext: &str| {
        let mut name = OsString::from(report_name.as_os_str());
        name.push(ext);
        PathBuf::from(name)
    };
    (with(".json"), with(".svg"))
}

fn validate_experiments(experiments: &ExperimentSet) -> Result<(), AppError> {
    if experiments.is_empty() {
        return Err(AppError::InvalidArgument("no datasets given".to_string()));
    }
    for (i, path) in experiments.filepaths.iter().enumerate() {
        let t = experiments.temperatures[i];
        if !(t.is_finite() && t > 0.0) {
            return Err(AppError::InvalidArgument(format!(
                "{}: temperature must be > 0 K, got {t}",
                path.display()
            )));
        }
        experiments
            .conditions(i)
            .validate()
            .map_err(|msg| AppError::InvalidArgument(format!("{}: {msg}", path.display())))?;
    }
    Ok(())
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), AppError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .map_err(|e| AppError::io(format!("failed to create '{}'", parent.display()), e)),
        _ => Ok(()),
    }
}
