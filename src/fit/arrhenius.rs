//! Activation energy from rate constants measured at several temperatures.
//!
//! `ln k = ln A - Ea / (R T)`, so a straight line of `ln k` against `1/T` has
//! slope `m = -Ea / R`. Energies are reported in kJ/mol.

use tracing::debug;

use crate::domain::{ActivationEnergyReport, AnalysisConfig, ArrheniusFit, RateConstantRecord, SolverOptions};
use crate::error::NumericError;
use crate::fit::fit_curve;
use crate::models::ModelKind;

/// Arrhenius regression without the per-dataset records.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrheniusRegression {
    /// kJ/mol.
    pub activation_energy: f64,
    /// kJ/mol.
    pub standard_deviation: f64,
    pub r_squared: f64,
    pub fit: ArrheniusFit,
}

pub fn fit_arrhenius(
    temperatures: &[f64],
    rate_constants: &[f64],
    gas_constant: f64,
    opts: &SolverOptions,
) -> Result<ArrheniusRegression, NumericError> {
    if temperatures.len() != rate_constants.len() {
        return Err(NumericError::NonFinite(format!(
            "{} temperatures but {} rate constants",
            temperatures.len(),
            rate_constants.len()
        )));
    }
    if let Some(&k) = rate_constants.iter().find(|&&k| !(k > 0.0)) {
        return Err(NumericError::NonPositiveRateConstant(k));
    }

    let inverse_temperatures: Vec<f64> = temperatures.iter().map(|t| 1.0 / t).collect();
    let log_rate_constants: Vec<f64> = rate_constants.iter().map(|k| k.ln()).collect();
    let line = fit_curve(ModelKind::Linear, &inverse_temperatures, &log_rate_constants, opts)?;

    let slope = line.result.coefficients[0];
    let activation_energy = -slope * gas_constant / 1000.0;
    let standard_deviation = (line.result.standard_deviations[0] * gas_constant).abs() / 1000.0;
    debug!(
        points = temperatures.len(),
        activation_energy,
        standard_deviation,
        r_squared = line.result.r_squared,
        "arrhenius line fitted"
    );

    Ok(ArrheniusRegression {
        activation_energy,
        standard_deviation,
        r_squared: line.result.r_squared,
        fit: ArrheniusFit {
            coefficients: line.result.coefficients,
            standard_deviation: line.result.standard_deviations,
            inverse_temperatures,
            log_rate_constants,
        },
    })
}

/// Combine per-dataset records (in input order) into the final report.
pub fn estimate_activation_energy(
    config: &AnalysisConfig,
    temperatures: &[f64],
    records: Vec<RateConstantRecord>,
) -> Result<ActivationEnergyReport, NumericError> {
    let rate_constants: Vec<f64> = records.iter().map(|r| r.rate_constant.value).collect();
    let regression = fit_arrhenius(temperatures, &rate_constants, config.gas_constant, &config.solver)?;
    Ok(ActivationEnergyReport {
        activation_energy: regression.activation_energy,
        standard_deviation: regression.standard_deviation,
        r_squared: regression.r_squared,
        arrhenius_fit: regression.fit,
        rate_constant_records: records,
    })
}
