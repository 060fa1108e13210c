//! Conductivity–time calibration.
//!
//! The start of a run is disturbed by mixing and temperature equilibration, and
//! the true reaction start is not known precisely. Calibration therefore:
//!
//! 1. discards `cycle × leading_points_to_trim` leading samples of the raw series,
//!    together with the configured bad indices (also raw positions)
//! 2. rejects outliers on what remains
//! 3. fits `k(t) = (a + b·t) / (1 + c·t)`
//!
//! and repeats with the next cycle until R² reaches the configured threshold.
//! The number of cycles is capped by `max_calibration_cycles`.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::domain::{AnalysisConfig, CalibrationDiagnostics, Series};
use crate::error::NumericError;
use crate::fit::{fit_curve, reject_outliers};
use crate::models::ModelKind;

/// Accepted calibration of one dataset.
#[derive(Debug, Clone)]
pub struct Calibration {
    pub fit: crate::domain::FitResult,
    /// Surviving sample times with the fitted (not observed) conductivity.
    pub predicted: Series,
    pub diagnostics: CalibrationDiagnostics,
}

pub fn calibrate(raw: &Series, config: &AnalysisConfig) -> Result<Calibration, NumericError> {
    let needed = ModelKind::Rational.param_count();
    let mut best_r_squared = f64::NEG_INFINITY;
    let mut cycles = 0;

    for cycle in 1..=config.max_calibration_cycles {
        cycles = cycle;
        let points_trimmed = (cycle * config.leading_points_to_trim).min(raw.len());
        let (trimmed, excluded) = trim_raw(raw, points_trimmed, &config.initial_bad_indices);
        let filtered = reject_outliers(&trimmed, config);
        let rejected = excluded + filtered.rejected;
        let series = filtered.series;
        if series.len() < needed {
            return Err(NumericError::TooFewPoints {
                needed,
                got: series.len(),
            });
        }

        let fit = fit_curve(ModelKind::Rational, series.time(), series.conductivity(), &config.solver)?;
        let r_squared = fit.result.r_squared;
        debug!(
            cycle,
            points = series.len(),
            points_trimmed,
            rejected,
            r_squared,
            iterations = fit.iterations,
            "calibration cycle"
        );

        if r_squared >= config.r_squared_threshold {
            let predicted = series
                .with_conductivity(fit.predicted)
                .map_err(|e| NumericError::NonFinite(e.to_string()))?;
            return Ok(Calibration {
                fit: fit.result,
                diagnostics: CalibrationDiagnostics {
                    raw_points: raw.len(),
                    points_used: predicted.len(),
                    points_trimmed,
                    points_rejected: rejected,
                    calibration_cycles: cycle,
                },
                predicted,
            });
        }

        if r_squared > best_r_squared {
            best_r_squared = r_squared;
        }
        if config.leading_points_to_trim == 0 {
            // Every further cycle would refit the same points.
            break;
        }
    }

    warn!(
        threshold = config.r_squared_threshold,
        cycles, best_r_squared, "calibration never reached the R² threshold"
    );
    Err(NumericError::ThresholdNotReached {
        threshold: config.r_squared_threshold,
        cycles,
        best_r_squared,
    })
}

/// Drop the leading `points_trimmed` samples and the configured bad indices,
/// both counted in the raw series. Returns the remainder and how many bad
/// indices fell outside the trimmed prefix.
fn trim_raw(raw: &Series, points_trimmed: usize, bad_indices: &[usize]) -> (Series, usize) {
    let excluded = bad_indices
        .iter()
        .filter(|&&i| i >= points_trimmed && i < raw.len())
        .collect::<BTreeSet<_>>()
        .len();
    let series = raw.without_indices(|i| i < points_trimmed || bad_indices.contains(&i));
    (series, excluded)
}
