mod common;

use common::Workspace;
use saponification_kinetics::domain::ColumnSelection;
use saponification_kinetics::error::AppError;
use saponification_kinetics::io::load_config;

#[test]
fn config_file_with_current_keys() {
    let ws = Workspace::new();
    let path = ws.write(
        "config.json",
        r#"{
            "sheet_name": "Data",
            "columns": [0, 2],
            "leading_points_to_trim": 2,
            "r_squared_threshold": 0.9999,
            "outlier_threshold_multiplier": 5.0,
            "outlier_rejection_passes": 1,
            "gas_constant": 8.314462618,
            "max_calibration_cycles": 20,
            "solver": { "max_iterations": 500 }
        }"#,
    );

    let config = load_config(&path).expect("valid config");
    assert_eq!(config.columns, ColumnSelection::Indices(vec![0, 2]));
    assert_eq!(config.columns.resolve(), Ok((0, 2)));
    assert_eq!(config.max_calibration_cycles, 20);
    assert_eq!(config.solver.max_iterations, 500);
    assert_eq!(config.solver.tolerance, 1e-12);
}

#[test]
fn config_file_with_legacy_keys() {
    let ws = Workspace::new();
    let path = ws.write(
        "config.json",
        r#"{
            "sheetname": "Sheet1",
            "cols": "A:B",
            "calibrating_remove_item_count": 5,
            "R_square_threshold": 0.9995,
            "bad_data_threshold": 3,
            "bad_data_popping_times": 2,
            "molar_gas_constant": 8.314
        }"#,
    );

    let config = load_config(&path).expect("valid config");
    assert_eq!(config.sheet_name, "Sheet1");
    assert_eq!(config.leading_points_to_trim, 5);
    assert_eq!(config.outlier_threshold_multiplier, 3.0);
    assert!(config.initial_bad_indices.is_empty());
}

#[test]
fn missing_and_malformed_files_are_config_errors() {
    let ws = Workspace::new();
    let missing = load_config(&ws.path("nope.json")).unwrap_err();
    assert!(matches!(missing, AppError::Config(_)));

    let malformed = load_config(&ws.write("bad.json", "{ not json")).unwrap_err();
    assert!(matches!(malformed, AppError::Config(_)));
    assert_eq!(malformed.exit_code(), 2);

    let same_columns = ws.write(
        "cols.json",
        r#"{"sheet_name": "S", "columns": [1, 1], "leading_points_to_trim": 0, "r_squared_threshold": 0.9,
            "outlier_threshold_multiplier": 5, "outlier_rejection_passes": 0, "gas_constant": 8.314}"#,
    );
    assert!(matches!(load_config(&same_columns), Err(AppError::Config(_))));
}
