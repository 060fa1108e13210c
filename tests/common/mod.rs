#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use saponification_kinetics::data::{RunParameters, arrhenius_rate_constant, generate_run};
use saponification_kinetics::domain::{AnalysisConfig, ColumnSelection, ExperimentSet, ReactionConditions, Series, SolverOptions};
use saponification_kinetics::io::write_series_csv;
use tempfile::TempDir;

pub const TEMPERATURES: [f64; 3] = [298.15, 299.15, 301.15];
pub const K_0: [f64; 3] = [2313.0, 2359.0, 2424.0];
pub const K_INF: [f64; 3] = [759.0, 780.0, 812.0];
pub const C_0: f64 = 0.0094;

/// kJ/mol.
pub const ACTIVATION_ENERGY: f64 = 45.0;
pub const PRE_EXPONENTIAL: f64 = 8.0e6;
pub const GAS_CONSTANT: f64 = 8.314;

/// Scratch directory for one test.
pub struct Workspace {
    _tmp: TempDir,
    pub root: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().to_path_buf();
        Self { _tmp: tmp, root }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn write(&self, name: &str, text: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, text).expect("write fixture");
        path
    }

    pub fn write_series(&self, name: &str, series: &Series) -> PathBuf {
        let path = self.path(name);
        write_series_csv(&path, series).expect("write dataset");
        path
    }

    /// Three noisy runs with a mixing transient and a few spikes, one per temperature.
    pub fn three_temperature_set(&self) -> ExperimentSet {
        let filepaths = (0..3)
            .map(|i| {
                let series = realistic_run(true_rate_constant(TEMPERATURES[i]), conditions(i), 100 + i as u64);
                self.write_series(&format!("run-{i}.csv"), &series)
            })
            .collect();

        ExperimentSet {
            filepaths,
            temperatures: TEMPERATURES.to_vec(),
            k_0: K_0.to_vec(),
            k_inf: K_INF.to_vec(),
            c_0: vec![C_0; 3],
        }
    }

    pub fn entries(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(&self.root)
            .expect("list workspace")
            .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

pub fn conditions(i: usize) -> ReactionConditions {
    ReactionConditions {
        k_0: K_0[i],
        k_inf: K_INF[i],
        c_0: C_0,
    }
}

pub fn true_rate_constant(temperature: f64) -> f64 {
    arrhenius_rate_constant(ACTIVATION_ENERGY, PRE_EXPONENTIAL, temperature, GAS_CONSTANT)
}

/// 201 readings over 20 minutes, started 30 s after mixing, low noise, a
/// three-point mixing transient and three isolated spikes.
pub fn realistic_run(rate_constant: f64, conditions: ReactionConditions, seed: u64) -> Series {
    let params = RunParameters {
        start_offset: 30.0,
        noise: 0.05,
        transient_points: 3,
        transient_depth: 300.0,
        ..RunParameters::ideal(rate_constant, conditions, 1200.0, 6.0)
    };
    let run = generate_run(&params, seed).expect("generate run");

    let mut conductivity = run.conductivity().to_vec();
    for i in [50, 120, 170] {
        conductivity[i] += 60.0;
    }
    run.with_conductivity(conductivity).expect("spiked run")
}

pub fn config() -> AnalysisConfig {
    AnalysisConfig {
        sheet_name: "Sheet1".to_string(),
        columns: ColumnSelection::Letters("A:B".to_string()),
        leading_points_to_trim: 2,
        r_squared_threshold: 0.9999,
        outlier_threshold_multiplier: 5.0,
        outlier_rejection_passes: 1,
        gas_constant: GAS_CONSTANT,
        initial_bad_indices: Vec::new(),
        max_calibration_cycles: 100,
        solver: SolverOptions::default(),
    }
}

pub fn exists(path: &Path) -> bool {
    path.try_exists().unwrap_or(false)
}
