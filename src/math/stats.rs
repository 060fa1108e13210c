//! Small descriptive statistics shared by the fitting stages.

use nalgebra::DMatrix;

/// Coefficient of determination `1 - SSres / SStot`.
///
/// A constant `y_data` has no variance to explain: the result is `1.0` for a
/// perfect prediction and `-∞` otherwise.
pub fn determination_coefficient(y_data: &[f64], y_pred: &[f64]) -> f64 {
    debug_assert_eq!(y_data.len(), y_pred.len());
    if y_data.is_empty() {
        return f64::NAN;
    }
    let mean = y_data.iter().sum::<f64>() / y_data.len() as f64;
    let (ss_res, ss_tot) = y_data
        .iter()
        .zip(y_pred.iter())
        .fold((0.0, 0.0), |(res, tot), (&y, &f)| {
            (res + (y - f) * (y - f), tot + (y - mean) * (y - mean))
        });
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { f64::NEG_INFINITY };
    }
    1.0 - ss_res / ss_tot
}

/// The "typical magnitude" used by outlier rejection.
///
/// This is not the textbook median and must not be turned into one, because
/// the outlier threshold depends on it:
///
/// - odd length: half the gap between the two sorted values around the centre,
///   `(s[n/2] - s[n/2 - 1]) / 2`
/// - even length: the lower of the two central sorted values, `s[(n - 1) / 2]`
///
/// Returns `None` for empty input.
pub fn median_variant(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    if n % 2 == 1 {
        if n == 1 {
            // No lower neighbour around the centre.
            return Some(0.0);
        }
        Some((sorted[n / 2] - sorted[n / 2 - 1]) / 2.0)
    } else {
        Some(sorted[(n - 1) / 2])
    }
}

/// `sqrt` of the covariance diagonal.
pub fn standard_deviations(covariance: &DMatrix<f64>) -> Vec<f64> {
    covariance.diagonal().iter().map(|v| v.max(0.0).sqrt()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_prediction_has_unit_r_squared() {
        let y = [1.0, 4.0, 2.0, 8.0];
        assert_eq!(determination_coefficient(&y, &y), 1.0);
    }

    #[test]
    fn mean_prediction_has_zero_r_squared() {
        let y = [1.0, 4.0, 2.0, 9.0];
        let mean = [4.0; 4];
        assert_eq!(determination_coefficient(&y, &mean), 0.0);
    }

    #[test]
    fn r_squared_is_unbounded_below() {
        let y = [0.0, 1.0, 2.0];
        let bad = [10.0, -10.0, 10.0];
        assert!(determination_coefficient(&y, &bad) < -10.0);
    }

    #[test]
    fn median_variant_even_length_takes_lower_centre() {
        assert_eq!(median_variant(&[4.0, 1.0, 3.0, 2.0]), Some(2.0));
        assert_eq!(median_variant(&[-3.0, -1.0]), Some(-3.0));
    }

    #[test]
    fn median_variant_odd_length_takes_half_centre_gap() {
        assert_eq!(median_variant(&[1.0, 2.0, 4.0]), Some(0.5));
        assert_eq!(median_variant(&[5.0, -1.0, 9.0, 2.0, 3.0]), Some(0.5));
        assert_eq!(median_variant(&[7.0]), Some(0.0));
        assert_eq!(median_variant(&[]), None);
    }

    #[test]
    fn standard_deviations_from_diagonal() {
        let cov = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 9.0]);
        assert_eq!(standard_deviations(&cov), vec![2.0, 3.0]);
    }
}
