//! Analysis configuration file.
//!
//! The file is JSON and is read once per process. Lookup order:
//! 1. `--config <path>`
//! 2. `SAPK_CONFIG` (a `.env` file in the working directory is honoured)
//! 3. `./config.json`

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::AnalysisConfig;
use crate::error::AppError;

pub const CONFIG_ENV_VAR: &str = "SAPK_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Pick the configuration file from the CLI flag, then the environment value.
pub fn resolve_config_path(flag: Option<&Path>, env_value: Option<String>) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    match env_value {
        Some(value) if !value.trim().is_empty() => PathBuf::from(value.trim()),
        _ => PathBuf::from(DEFAULT_CONFIG_PATH),
    }
}

/// [`resolve_config_path`] against the process environment.
pub fn config_path_from_env(flag: Option<&Path>) -> PathBuf {
    dotenvy::dotenv().ok();
    resolve_config_path(flag, std::env::var(CONFIG_ENV_VAR).ok())
}

pub fn load_config(path: &Path) -> Result<AnalysisConfig, AppError> {
    info!(path = %path.display(), "loading config file");
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("failed to read '{}': {e}", path.display())))?;
    parse_config(&text).map_err(|e| match e {
        AppError::Config(msg) => AppError::Config(format!("'{}': {msg}", path.display())),
        other => other,
    })
}

/// Parse and validate configuration JSON.
pub fn parse_config(text: &str) -> Result<AnalysisConfig, AppError> {
    let config: AnalysisConfig =
        serde_json::from_str(text).map_err(|e| AppError::Config(format!("invalid configuration JSON: {e}")))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ColumnSelection;

    const LEGACY: &str = r#"{
        "sheetname": "Sheet1",
        "cols": "A:B",
        "calibrating_remove_item_count": 3,
        "R_square_threshold": 0.9995,
        "bad_data_threshold": 4.0,
        "bad_data_popping_times": 2,
        "molar_gas_constant": 8.314,
        "bad_data_initial_value": [0]
    }"#;

    #[test]
    fn legacy_keys_are_accepted() {
        let config = parse_config(LEGACY).unwrap();
        assert_eq!(config.sheet_name, "Sheet1");
        assert_eq!(config.columns, ColumnSelection::Letters("A:B".to_string()));
        assert_eq!(config.leading_points_to_trim, 3);
        assert_eq!(config.outlier_rejection_passes, 2);
        assert_eq!(config.initial_bad_indices, vec![0]);
        assert_eq!(config.max_calibration_cycles, 100);
        assert_eq!(config.solver.max_iterations, 200);
    }

    #[test]
    fn out_of_range_threshold_is_a_config_error() {
        let text = LEGACY.replace("0.9995", "1.5");
        assert!(matches!(parse_config(&text), Err(AppError::Config(_))));
    }

    #[test]
    fn missing_field_is_a_config_error() {
        let err = parse_config(r#"{"sheet_name": "Sheet1"}"#).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn flag_beats_environment_beats_default() {
        let flag = Path::new("from-flag.json");
        assert_eq!(resolve_config_path(Some(flag), Some("env.json".into())), flag);
        assert_eq!(resolve_config_path(None, Some("env.json".into())), PathBuf::from("env.json"));
        assert_eq!(resolve_config_path(None, Some("  ".into())), PathBuf::from(DEFAULT_CONFIG_PATH));
        assert_eq!(resolve_config_path(None, None), PathBuf::from(DEFAULT_CONFIG_PATH));
    }
}
