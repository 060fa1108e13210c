//! Dataset ingest.
//!
//! A dataset is a table whose selected columns hold time and conductivity.
//! Spreadsheets (`.xlsx`, `.xlsm`, `.xls`, `.ods`) are read from the configured
//! sheet; `.csv` files are read as-is. Rules shared by both:
//! - a first row whose selected cells are not both numeric is a header and is skipped
//! - rows where both selected cells are empty are skipped
//! - anything else that is not numeric is an error naming the 1-based row

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use tracing::info;

use crate::domain::{AnalysisConfig, Series};
use crate::error::AppError;

/// One selected cell, reduced to what ingest cares about.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            Cell::Empty
        } else {
            match text.parse::<f64>() {
                Ok(v) => Cell::Number(v),
                Err(_) => Cell::Text(text.to_string()),
            }
        }
    }

    fn from_data(data: &Data) -> Self {
        match data {
            Data::Float(v) => Cell::Number(*v),
            Data::Int(v) => Cell::Number(*v as f64),
            Data::String(s) => Cell::parse(s),
            Data::Empty => Cell::Empty,
            other => Cell::Text(other.to_string()),
        }
    }
}

/// Load the time/conductivity series of one dataset.
pub fn load_series(path: &Path, config: &AnalysisConfig) -> Result<Series, AppError> {
    let dataset = path.display().to_string();
    let (time_col, conductivity_col) = config.columns.resolve().map_err(AppError::Config)?;
    info!(dataset = %dataset, "loading file");

    let rows = match extension(path).as_str() {
        "csv" => read_csv_rows(path, time_col, conductivity_col)?,
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => {
            read_sheet_rows(path, &config.sheet_name, time_col, conductivity_col)?
        }
        other => {
            return Err(AppError::dataset(
                &dataset,
                format!("unsupported file extension '{other}' (expected csv, xlsx, xls or ods)"),
            ));
        }
    };

    rows_to_series(&dataset, rows)
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

fn read_csv_rows(path: &Path, time_col: usize, conductivity_col: usize) -> Result<Vec<(Cell, Cell)>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| AppError::io(format!("failed to open '{}'", path.display()), e))?;

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record =
            record.map_err(|e| AppError::dataset(path.display().to_string(), format!("row {}: {e}", idx + 1)))?;
        let cell = |col: usize| record.get(col).map(Cell::parse).unwrap_or(Cell::Empty);
        rows.push((cell(time_col), cell(conductivity_col)));
    }
    Ok(rows)
}

fn read_sheet_rows(
    path: &Path,
    sheet_name: &str,
    time_col: usize,
    conductivity_col: usize,
) -> Result<Vec<(Cell, Cell)>, AppError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| AppError::io(format!("failed to open '{}'", path.display()), e))?;
    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| AppError::dataset(path.display().to_string(), format!("sheet '{sheet_name}': {e}")))?;

    Ok(range
        .rows()
        .map(|row| {
            let cell = |col: usize| row.get(col).map(Cell::from_data).unwrap_or(Cell::Empty);
            (cell(time_col), cell(conductivity_col))
        })
        .collect())
}

fn rows_to_series(dataset: &str, rows: Vec<(Cell, Cell)>) -> Result<Series, AppError> {
    let mut time = Vec::with_capacity(rows.len());
    let mut conductivity = Vec::with_capacity(rows.len());

    for (idx, row) in rows.into_iter().enumerate() {
        match row {
            (Cell::Number(t), Cell::Number(k)) => {
                time.push(t);
                conductivity.push(k);
            }
            (Cell::Empty, Cell::Empty) => {}
            _ if idx == 0 => {} // header
            (t, k) => {
                return Err(AppError::dataset(
                    dataset,
                    format!("row {}: expected numeric time and conductivity, got {t:?} and {k:?}", idx + 1),
                ));
            }
        }
    }

    if time.is_empty() {
        return Err(AppError::dataset(dataset, "no numeric rows found"));
    }
    Series::new(time, conductivity).map_err(|e| AppError::dataset(dataset, e.to_string()))
}

/// Write a series as a two-column CSV with a `time,conductivity` header.
pub fn write_series_csv(path: &Path, series: &Series) -> Result<(), AppError> {
    let mut writer =
        csv::Writer::from_path(path).map_err(|e| AppError::io(format!("failed to create '{}'", path.display()), e))?;
    let context = || format!("failed to write '{}'", path.display());

    writer
        .write_record(["time", "conductivity"])
        .map_err(|e| AppError::io(context(), e))?;
    for (t, k) in series.time().iter().zip(series.conductivity()) {
        writer
            .write_record([t.to_string(), k.to_string()])
            .map_err(|e| AppError::io(context(), e))?;
    }
    writer.flush().map_err(|e| AppError::io(context(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::domain::{ColumnSelection, test_config};

    fn write(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn csv_with_header_and_blank_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "run.csv", "time,kappa\n0,2313\n6,2300.5\n,\n12,2288\n");

        let series = load_series(&path, &test_config()).unwrap();
        assert_eq!(series.time(), &[0.0, 6.0, 12.0]);
        assert_eq!(series.conductivity(), &[2313.0, 2300.5, 2288.0]);
    }

    #[test]
    fn selected_columns_are_honoured() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "run.csv", "1,0,x,10\n2,1,y,9\n");
        let config = AnalysisConfig {
            columns: ColumnSelection::Letters("B,D".to_string()),
            ..test_config()
        };

        let series = load_series(&path, &config).unwrap();
        assert_eq!(series.time(), &[0.0, 1.0]);
        assert_eq!(series.conductivity(), &[10.0, 9.0]);
    }

    #[test]
    fn text_after_header_names_the_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "run.csv", "t,k\n0,1\n1,oops\n");

        let err = load_series(&path, &test_config()).unwrap_err();
        assert!(matches!(err, AppError::Dataset { .. }));
        assert!(err.to_string().contains("row 3"), "{err}");
    }

    #[test]
    fn non_increasing_time_is_a_dataset_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "run.csv", "0,1\n2,1\n1,1\n");
        assert!(matches!(load_series(&path, &test_config()), Err(AppError::Dataset { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_series(Path::new("/nonexistent/run.csv"), &test_config()).unwrap_err();
        assert_eq!(err.exit_code(), 5);
        assert!(matches!(err, AppError::Io { .. }));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_series(Path::new("run.txt"), &test_config()).unwrap_err();
        assert!(matches!(err, AppError::Dataset { .. }));
    }

    #[test]
    fn written_csv_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let series = Series::new(vec![0.0, 0.5, 1.0], vec![2313.0, 2200.25, 2100.0]).unwrap();

        write_series_csv(&path, &series).unwrap();
        assert_eq!(load_series(&path, &test_config()).unwrap(), series);
    }
}
