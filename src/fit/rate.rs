//! Rate constant from the derivative of the calibrated curve.
//!
//! For equal initial concentrations `c_0` of ester and hydroxide, conductivity
//! obeys
//!
//! ```text
//! dk/dt = m · (k_inf - k)²,   m = k · c_0 / (k_inf - k_0)
//! ```
//!
//! so a straight line of the derivative against `(k_inf - k)²` gives the rate
//! constant `k = m · (k_inf - k_0) / c_0` without knowing when the reaction started.

use tracing::debug;

use crate::domain::{
    AnalysisConfig, CalibratedSeries, RateConstant, RateConstantRecord, ReactionConditions, Series, SolverOptions,
};
use crate::error::NumericError;
use crate::fit::{Calibration, calibrate, estimate_derivative, fit_curve};
use crate::models::ModelKind;

/// `(k_inf - k)²` for every calibrated conductivity `k`.
pub fn linearizing_variable(k_inf: f64, conductivity: &[f64]) -> Vec<f64> {
    conductivity.iter().map(|k| (k_inf - k) * (k_inf - k)).collect()
}

/// Fit the derivative line and assemble the record for one dataset.
///
/// `k_0`, `k_inf` and `c_0` are treated as exact; only the slope uncertainty
/// propagates into the rate constant.
pub fn estimate_rate_constant(
    source_id: &str,
    calibration: Calibration,
    derivative: Vec<f64>,
    conditions: ReactionConditions,
    opts: &SolverOptions,
) -> Result<RateConstantRecord, NumericError> {
    let conductivity = calibration.predicted.conductivity();
    let transformed = linearizing_variable(conditions.k_inf, conductivity);
    let line = fit_curve(ModelKind::Linear, &transformed, &derivative, opts)?;

    let factor = (conditions.k_inf - conditions.k_0) / conditions.c_0;
    let slope = line.result.coefficients[0];
    let slope_sd = line.result.standard_deviations[0];
    let value = slope * factor;
    let standard_deviation = (slope_sd * factor).abs();
    if !value.is_finite() {
        return Err(NumericError::NonFinite("rate constant".to_string()));
    }
    debug!(
        source_id,
        rate_constant = value,
        standard_deviation,
        r_squared = line.result.r_squared,
        "derivative line fitted"
    );

    Ok(RateConstantRecord {
        source_id: source_id.to_string(),
        rate_constant: RateConstant {
            value,
            standard_deviation,
            k_0: conditions.k_0,
            k_inf: conditions.k_inf,
            c_0: conditions.c_0,
        },
        calibration_fit: calibration.fit,
        derivative_fit: line.result,
        calibrated_series: CalibratedSeries {
            time: calibration.predicted.time().to_vec(),
            conductivity: conductivity.to_vec(),
            derivative,
        },
        diagnostics: calibration.diagnostics,
    })
}

/// Calibrate, differentiate and fit one raw dataset.
pub fn rate_constant_from_series(
    source_id: &str,
    raw: &Series,
    conditions: ReactionConditions,
    config: &AnalysisConfig,
) -> Result<RateConstantRecord, NumericError> {
    let calibration = calibrate(raw, config)?;
    let derivative = estimate_derivative(&calibration.predicted)?;
    estimate_rate_constant(source_id, calibration, derivative, conditions, &config.solver)
}
