//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during calibration and fitting
//! - exported to the JSON report
//! - printed by the terminal summaries

use std::path::PathBuf;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AppError;

/// Why a `(time, conductivity)` pair of columns cannot form a [`Series`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("time has {time} values but conductivity has {conductivity}")]
    LengthMismatch { time: usize, conductivity: usize },
    #[error("non-finite value at row {index}")]
    NonFinite { index: usize },
    #[error("time is not strictly increasing at row {index}")]
    NotIncreasing { index: usize },
}

/// Ordered `(time, conductivity)` samples with strictly increasing time.
///
/// A series is never edited in place: trimming and outlier rejection build a
/// new series from the old one.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    time: Vec<f64>,
    conductivity: Vec<f64>,
}

impl Series {
    pub fn new(time: Vec<f64>, conductivity: Vec<f64>) -> Result<Self, SeriesError> {
        if time.len() != conductivity.len() {
            return Err(SeriesError::LengthMismatch {
                time: time.len(),
                conductivity: conductivity.len(),
            });
        }
        for (i, (t, k)) in time.iter().zip(conductivity.iter()).enumerate() {
            if !(t.is_finite() && k.is_finite()) {
                return Err(SeriesError::NonFinite { index: i });
            }
        }
        if let Some(i) = time.windows(2).position(|w| w[1] <= w[0]) {
            return Err(SeriesError::NotIncreasing { index: i + 1 });
        }
        Ok(Self { time, conductivity })
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn conductivity(&self) -> &[f64] {
        &self.conductivity
    }

    /// Drop the first `count` samples (all of them if `count >= len`).
    pub fn skip_leading(&self, count: usize) -> Series {
        let start = count.min(self.len());
        Series {
            time: self.time[start..].to_vec(),
            conductivity: self.conductivity[start..].to_vec(),
        }
    }

    /// Drop every sample whose index satisfies `excluded`.
    pub fn without_indices(&self, excluded: impl Fn(usize) -> bool) -> Series {
        let (time, conductivity) = self
            .time
            .iter()
            .zip(self.conductivity.iter())
            .enumerate()
            .filter(|(i, _)| !excluded(*i))
            .map(|(_, (&t, &k))| (t, k))
            .unzip();
        Series { time, conductivity }
    }

    /// Same time axis, new ordinate values (e.g. model predictions).
    pub fn with_conductivity(&self, conductivity: Vec<f64>) -> Result<Series, SeriesError> {
        Series::new(self.time.clone(), conductivity)
    }
}

/// Coefficients, covariance and goodness of fit of one regression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitResult {
    pub coefficients: Vec<f64>,
    pub covariance: Vec<Vec<f64>>,
    pub standard_deviations: Vec<f64>,
    pub r_squared: f64,
}

impl FitResult {
    pub fn new(coefficients: Vec<f64>, covariance: &DMatrix<f64>, r_squared: f64) -> Self {
        debug_assert_eq!(covariance.nrows(), coefficients.len());
        let covariance_rows = (0..covariance.nrows())
            .map(|i| covariance.row(i).iter().copied().collect())
            .collect();
        Self {
            standard_deviations: crate::math::standard_deviations(covariance),
            coefficients,
            covariance: covariance_rows,
            r_squared,
        }
    }
}

/// File-level constants of one saponification run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReactionConditions {
    /// Initial conductivity (NaOH at `c_0`).
    pub k_0: f64,
    /// End conductivity (NaOAc at `c_0`).
    pub k_inf: f64,
    /// Initial concentration of both substrates.
    pub c_0: f64,
}

impl ReactionConditions {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.k_0.is_finite() && self.k_inf.is_finite()) {
            return Err(format!("k_0 and k_inf must be finite (got {}, {})", self.k_0, self.k_inf));
        }
        if self.k_0 == self.k_inf {
            return Err(format!("k_0 and k_inf must differ (both {})", self.k_0));
        }
        if !(self.c_0.is_finite() && self.c_0 > 0.0) {
            return Err(format!("c_0 must be a positive concentration (got {})", self.c_0));
        }
        Ok(())
    }
}

/// Pseudo-first-order rate constant together with the constants it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateConstant {
    pub value: f64,
    pub standard_deviation: f64,
    pub k_0: f64,
    pub k_inf: f64,
    pub c_0: f64,
}

/// The calibrated curve on which the derivative fit was made.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibratedSeries {
    pub time: Vec<f64>,
    pub conductivity: Vec<f64>,
    pub derivative: Vec<f64>,
}

/// How much of the raw dataset survived calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalibrationDiagnostics {
    pub raw_points: usize,
    pub points_used: usize,
    pub points_trimmed: usize,
    pub points_rejected: usize,
    pub calibration_cycles: usize,
}

/// Result of analysing one dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateConstantRecord {
    pub source_id: String,
    pub rate_constant: RateConstant,
    pub calibration_fit: FitResult,
    pub derivative_fit: FitResult,
    pub calibrated_series: CalibratedSeries,
    pub diagnostics: CalibrationDiagnostics,
}

/// `ln k = m·(1/T) + b` regression data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrheniusFit {
    pub coefficients: Vec<f64>,
    pub standard_deviation: Vec<f64>,
    pub inverse_temperatures: Vec<f64>,
    pub log_rate_constants: Vec<f64>,
}

/// Terminal artifact of a multi-temperature analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivationEnergyReport {
    /// kJ/mol.
    pub activation_energy: f64,
    /// kJ/mol.
    pub standard_deviation: f64,
    pub r_squared: f64,
    pub arrhenius_fit: ArrheniusFit,
    pub rate_constant_records: Vec<RateConstantRecord>,
}

/// Parallel per-dataset inputs of the Arrhenius analysis.
#[derive(Debug, Clone, Default)]
pub struct ExperimentSet {
    pub filepaths: Vec<PathBuf>,
    /// Kelvin.
    pub temperatures: Vec<f64>,
    pub k_0: Vec<f64>,
    pub k_inf: Vec<f64>,
    pub c_0: Vec<f64>,
}

impl ExperimentSet {
    pub fn len(&self) -> usize {
        self.filepaths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filepaths.is_empty()
    }

    /// All five sequences must have the same length.
    pub fn validate_shape(&self) -> Result<(), AppError> {
        let n = self.filepaths.len();
        let same = [
            self.temperatures.len(),
            self.k_0.len(),
            self.k_inf.len(),
            self.c_0.len(),
        ]
        .iter()
        .all(|&len| len == n);
        if same {
            Ok(())
        } else {
            Err(AppError::InputShape {
                filepaths: n,
                temperatures: self.temperatures.len(),
                k_0: self.k_0.len(),
                k_inf: self.k_inf.len(),
                c_0: self.c_0.len(),
            })
        }
    }

    pub fn conditions(&self, i: usize) -> ReactionConditions {
        ReactionConditions {
            k_0: self.k_0[i],
            k_inf: self.k_inf[i],
            c_0: self.c_0[i],
        }
    }
}

/// Which two spreadsheet columns hold time and conductivity.
///
/// Accepts zero-based indices (`[0, 1]`) or spreadsheet letters (`"A:B"`, `"A,C"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnSelection {
    Indices(Vec<usize>),
    Letters(String),
}

impl ColumnSelection {
    /// Resolve to `(time_column, conductivity_column)`.
    pub fn resolve(&self) -> Result<(usize, usize), String> {
        let columns = match self {
            ColumnSelection::Indices(indices) => indices.clone(),
            ColumnSelection::Letters(spec) => parse_letter_columns(spec)?,
        };
        match columns.as_slice() {
            [time, conductivity] if time != conductivity => Ok((*time, *conductivity)),
            _ => Err(format!(
                "exactly two distinct columns are required, got {columns:?}"
            )),
        }
    }
}

fn parse_letter_columns(spec: &str) -> Result<Vec<usize>, String> {
    let spec = spec.trim();
    if let Some((start, end)) = spec.split_once(':') {
        let start = column_index(start)?;
        let end = column_index(end)?;
        if end < start {
            return Err(format!("column range '{spec}' is reversed"));
        }
        if end - start > 1 {
            return Err(format!("column range '{spec}' spans more than two columns"));
        }
        return Ok((start..=end).collect());
    }
    spec.split(',').map(column_index).collect()
}

/// `A` -> 0, `B` -> 1, ..., `AA` -> 26.
fn column_index(letters: &str) -> Result<usize, String> {
    let letters = letters.trim();
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(format!("'{letters}' is not a spreadsheet column"));
    }
    let index = letters
        .chars()
        .try_fold(0usize, |acc, c| {
            acc.checked_mul(26)?
                .checked_add(c.to_ascii_uppercase() as usize - 'A' as usize + 1)
        })
        .ok_or_else(|| format!("column '{letters}' is out of range"))?;
    Ok(index - 1)
}

/// Levenberg–Marquardt stopping rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    pub max_iterations: usize,
    /// Relative tolerance on both the sum of squares and the step size.
    pub tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-12,
        }
    }
}

/// Process-wide analysis settings, loaded once and passed by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(alias = "sheetname")]
    pub sheet_name: String,
    #[serde(alias = "cols")]
    pub columns: ColumnSelection,
    /// Leading points discarded on every calibration cycle.
    #[serde(alias = "calibrating_remove_item_count")]
    pub leading_points_to_trim: usize,
    #[serde(alias = "R_square_threshold")]
    pub r_squared_threshold: f64,
    #[serde(alias = "bad_data_threshold")]
    pub outlier_threshold_multiplier: f64,
    #[serde(alias = "bad_data_popping_times")]
    pub outlier_rejection_passes: usize,
    /// J/(mol·K).
    #[serde(alias = "molar_gas_constant")]
    pub gas_constant: f64,
    /// Indices (into the trimmed series) rejected on the first outlier pass.
    #[serde(alias = "bad_data_initial_value", default)]
    pub initial_bad_indices: Vec<usize>,
    #[serde(default = "default_max_calibration_cycles")]
    pub max_calibration_cycles: usize,
    #[serde(default)]
    pub solver: SolverOptions,
}

fn default_max_calibration_cycles() -> usize {
    100
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        self.columns.resolve().map_err(AppError::Config)?;
        if !(self.r_squared_threshold > 0.0 && self.r_squared_threshold <= 1.0) {
            return Err(AppError::Config(format!(
                "r_squared_threshold must be in (0, 1], got {}",
                self.r_squared_threshold
            )));
        }
        if !(self.outlier_threshold_multiplier.is_finite() && self.outlier_threshold_multiplier > 0.0) {
            return Err(AppError::Config(format!(
                "outlier_threshold_multiplier must be > 0, got {}",
                self.outlier_threshold_multiplier
            )));
        }
        if !(self.gas_constant.is_finite() && self.gas_constant > 0.0) {
            return Err(AppError::Config(format!(
                "gas_constant must be > 0, got {}",
                self.gas_constant
            )));
        }
        if self.max_calibration_cycles == 0 {
            return Err(AppError::Config("max_calibration_cycles must be >= 1".to_string()));
        }
        if self.solver.max_iterations == 0 || !(self.solver.tolerance > 0.0) {
            return Err(AppError::Config(
                "solver.max_iterations and solver.tolerance must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> AnalysisConfig {
    AnalysisConfig {
        sheet_name: "Sheet1".to_string(),
        columns: ColumnSelection::Indices(vec![0, 1]),
        leading_points_to_trim: 2,
        r_squared_threshold: 0.999,
        outlier_threshold_multiplier: 5.0,
        outlier_rejection_passes: 0,
        gas_constant: 8.314,
        initial_bad_indices: Vec::new(),
        max_calibration_cycles: 100,
        solver: SolverOptions::default(),
    }
}
