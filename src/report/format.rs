//! Formatted terminal summaries.
//!
//! We keep formatting code in one place so:
//! - the fitting code stays free of presentation
//! - output changes are localized

use crate::domain::{ActivationEnergyReport, FitResult, RateConstantRecord};

/// Summary of a single dataset analysis.
pub fn format_rate_constant(record: &RateConstantRecord) -> String {
    let mut out = String::new();
    let k = &record.rate_constant;
    let d = &record.diagnostics;

    out.push_str(&format!("=== sapk - rate constant: {} ===\n", record.source_id));
    out.push_str(&format!("k_0={} | k_inf={} | c_0={}\n", k.k_0, k.k_inf, k.c_0));
    out.push_str(&format!(
        "Points: raw={} used={} trimmed={} rejected={} | cycles={}\n",
        d.raw_points, d.points_used, d.points_trimmed, d.points_rejected, d.calibration_cycles
    ));
    out.push_str(&format!("Calibration (a+b·t)/(1+c·t): {}\n", fmt_fit(&record.calibration_fit)));
    out.push_str(&format!("Derivative  m·(k_inf-k)²+b : {}\n", fmt_fit(&record.derivative_fit)));
    out.push_str(&format!("Rate constant: {} ± {}\n", fmt_num(k.value), fmt_num(k.standard_deviation)));

    out
}

/// Summary of a multi-temperature analysis, one table row per dataset.
pub fn format_activation_energy(report: &ActivationEnergyReport) -> String {
    let mut out = String::new();

    out.push_str("=== sapk - activation energy ===\n");
    out.push_str(
        format!(
            "{:<28} {:>9} {:>12} {:>12} {:>10} {:>10} {:>6} {:>6}\n",
            "dataset", "T [K]", "k", "sd(k)", "R² cal", "R² der", "used", "cycles"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<28} {:-<9} {:-<12} {:-<12} {:-<10} {:-<10} {:-<6} {:-<6}\n",
            "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for (record, inverse_t) in report
        .rate_constant_records
        .iter()
        .zip(&report.arrhenius_fit.inverse_temperatures)
    {
        out.push_str(
            format!(
                "{:<28} {:>9.2} {:>12} {:>12} {:>10.6} {:>10.6} {:>6} {:>6}\n",
                truncate(&record.source_id, 28),
                1.0 / inverse_t,
                fmt_num(record.rate_constant.value),
                fmt_num(record.rate_constant.standard_deviation),
                record.calibration_fit.r_squared,
                record.derivative_fit.r_squared,
                record.diagnostics.points_used,
                record.diagnostics.calibration_cycles,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out.push('\n');
    out.push_str(&format!(
        "ln k = m·(1/T) + b: {}\n",
        fmt_vec(&report.arrhenius_fit.coefficients)
    ));
    out.push_str(&format!(
        "Activation energy: {:.3} ± {:.3} kJ/mol (R²={:.6})\n",
        report.activation_energy, report.standard_deviation, report.r_squared
    ));

    out
}

fn fmt_fit(fit: &FitResult) -> String {
    format!(
        "coef={} sd={} R²={:.6}",
        fmt_vec(&fit.coefficients),
        fmt_vec(&fit.standard_deviations),
        fit.r_squared
    )
}

/// Scientific notation for small magnitudes, fixed otherwise.
fn fmt_num(v: f64) -> String {
    if v != 0.0 && v.is_finite() && (v.abs() < 1e-3 || v.abs() >= 1e6) {
        format!("{v:.4e}")
    } else {
        format!("{v:.6}")
    }
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| fmt_num(*x)).collect();
    format!("[{}]", parts.join(", "))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    // Keep the tail: file names are more telling than directories.
    let skip = s.chars().count() - (max - 1);
    let mut out = String::from("…");
    out.extend(s.chars().skip(skip));
    out
}
