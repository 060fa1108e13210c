//! Outlier rejection on successive conductivity differences.
//!
//! Each pass:
//! - computes `d_i = k_{i+1} - k_i`
//! - takes the typical magnitude `m` of the differences (`math::median_variant`)
//! - flags sample `i + 1` when `|d_i| > |multiplier · m|`
//! - builds a new series without the flagged samples
//!
//! The next pass works on the previous pass's output. The first sample never has
//! a difference of its own, so it is never flagged.

use std::collections::BTreeSet;

use tracing::debug;

use crate::domain::{AnalysisConfig, Series};
use crate::math::median_variant;

/// Filtered series plus how many samples were dropped.
#[derive(Debug, Clone)]
pub struct OutlierRejection {
    pub series: Series,
    pub rejected: usize,
}

pub fn reject_outliers(series: &Series, config: &AnalysisConfig) -> OutlierRejection {
    let mut current = series.clone();
    let mut rejected = 0;

    for pass in 0..config.outlier_rejection_passes {
        let flagged = flag_outliers(current.conductivity(), config.outlier_threshold_multiplier);
        if flagged.is_empty() {
            break;
        }
        debug!(pass, flagged = flagged.len(), remaining = current.len() - flagged.len(), "outliers rejected");
        rejected += flagged.len();
        current = current.without_indices(|i| flagged.contains(&i));
    }

    OutlierRejection {
        series: current,
        rejected,
    }
}

/// Indices whose step from the previous sample is anomalously large.
pub fn flag_outliers(conductivity: &[f64], multiplier: f64) -> BTreeSet<usize> {
    let differences: Vec<f64> = conductivity.windows(2).map(|w| w[1] - w[0]).collect();
    let Some(typical) = median_variant(&differences) else {
        return BTreeSet::new();
    };
    let limit = (multiplier * typical).abs();

    differences
        .iter()
        .enumerate()
        .filter(|(_, d)| d.abs() > limit)
        .map(|(i, _)| i + 1)
        .collect()
}
