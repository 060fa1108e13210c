//! JSON report files.
//!
//! Reports are written pretty-printed. Non-finite floats (for example the
//! standard deviations of an exactly determined fit) are written as `null`, so
//! reading back only picks the fields that are always finite.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Write any report value as pretty JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| AppError::io(format!("failed to create '{}'", path.display()), e))?;
    let context = || format!("failed to write '{}'", path.display());
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| AppError::io(context(), e))?;
    writer.flush().map_err(|e| AppError::io(context(), e))
}

/// The part of a saved activation-energy report needed to redraw its chart.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArrheniusPoints {
    /// `[slope, intercept]` of `ln k` against `1/T`.
    pub coefficients: Vec<f64>,
    pub inverse_temperatures: Vec<f64>,
    pub log_rate_constants: Vec<f64>,
}

#[derive(Deserialize)]
struct SavedReport {
    arrhenius_fit: ArrheniusPoints,
}

pub fn read_arrhenius_points(path: &Path) -> Result<ArrheniusPoints, AppError> {
    let file = File::open(path).map_err(|e| AppError::io(format!("failed to open '{}'", path.display()), e))?;
    let saved: SavedReport = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::dataset(path.display().to_string(), format!("invalid report JSON: {e}")))?;
    let points = saved.arrhenius_fit;
    if points.coefficients.len() != 2 || points.inverse_temperatures.len() != points.log_rate_constants.len() {
        return Err(AppError::dataset(
            path.display().to_string(),
            "arrhenius_fit needs two coefficients and equally long point lists",
        ));
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn chart_data_survives_null_standard_deviations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = json!({
            "activation_energy": 44.9,
            "standard_deviation": f64::INFINITY,
            "arrhenius_fit": {
                "coefficients": [-5400.0, 14.0],
                "standard_deviation": [f64::INFINITY, f64::INFINITY],
                "inverse_temperatures": [0.0033540, 0.0033428],
                "log_rate_constants": [-4.11, -4.05]
            },
            "rate_constant_records": []
        });
        write_json(&path, &report).unwrap();

        let points = read_arrhenius_points(&path).unwrap();
        assert_eq!(points.coefficients, vec![-5400.0, 14.0]);
        assert_eq!(points.log_rate_constants, vec![-4.11, -4.05]);
    }

    #[test]
    fn malformed_report_is_a_dataset_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        std::fs::write(&path, r#"{"arrhenius_fit": {"coefficients": [1.0]}}"#).unwrap();
        assert!(matches!(read_arrhenius_points(&path), Err(AppError::Dataset { .. })));
    }
}
