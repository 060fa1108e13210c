//! Low-level fitting routine for a single model kind.
//!
//! Given:
//! - abscissae `x_i`
//! - observed values `y_i`
//! - a model kind
//!
//! we solve:
//! - the linearised least-squares problem for a closed-form estimate
//! - Levenberg–Marquardt from that estimate (nonlinear models only)
//!
//! and return coefficients, their covariance, predictions and R².

use nalgebra::{DMatrix, DVector};

use crate::domain::{FitResult, SolverOptions};
use crate::error::NumericError;
use crate::math::{
    covariance_from_jacobian, determination_coefficient, fit_linear, levenberg_marquardt, solve_least_squares,
};
use crate::models::{ModelKind, fill_jacobian_row, fill_linearized_row, predict};

/// Best fit for a single model kind.
#[derive(Debug, Clone)]
pub struct CurveFit {
    pub model: ModelKind,
    pub result: FitResult,
    /// Model prediction at every input abscissa.
    pub predicted: Vec<f64>,
    pub sse: f64,
    /// Levenberg–Marquardt iterations (0 for closed-form fits).
    pub iterations: usize,
}

/// Fit `model` to `(x, y)` by least squares.
pub fn fit_curve(model: ModelKind, x: &[f64], y: &[f64], opts: &SolverOptions) -> Result<CurveFit, NumericError> {
    let p = model.param_count();
    let n = x.len();
    if y.len() != n {
        return Err(NumericError::NonFinite(format!(
            "{n} abscissae but {} observations",
            y.len()
        )));
    }
    if n < p {
        return Err(NumericError::TooFewPoints { needed: p, got: n });
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(NumericError::NonFinite("fit input".to_string()));
    }

    let mut design = DMatrix::<f64>::zeros(n, p);
    let mut row = vec![0.0; p];
    for i in 0..n {
        fill_linearized_row(model, x[i], y[i], &mut row);
        for j in 0..p {
            design[(i, j)] = row[j];
        }
    }
    let y_vec = DVector::from_column_slice(y);

    let (params, covariance, iterations) = if model.is_linear() {
        let linear = fit_linear(&design, &y_vec)?;
        (linear.coefficients, linear.covariance, 0)
    } else {
        // A failed linearisation still leaves a usable flat start.
        let initial: Vec<f64> = match solve_least_squares(&design, &y_vec) {
            Some(beta) => beta.iter().copied().collect(),
            None => {
                let mut flat = vec![0.0; p];
                flat[0] = y.iter().sum::<f64>() / n as f64;
                flat
            }
        };
        let solution = levenberg_marquardt(
            x,
            y,
            &initial,
            |xi, params| predict(model, xi, params),
            |xi, params, out| fill_jacobian_row(model, xi, params, out),
            opts,
        )?;
        let covariance = covariance_from_jacobian(&solution.jacobian, solution.sse);
        (solution.params, covariance, solution.iterations)
    };

    let coefficients: Vec<f64> = params.iter().copied().collect();
    let predicted: Vec<f64> = x.iter().map(|&xi| predict(model, xi, &coefficients)).collect();
    if predicted.iter().any(|v| !v.is_finite()) {
        return Err(NumericError::NonFinite(format!(
            "{} prediction",
            model.display_name()
        )));
    }
    let sse: f64 = y.iter().zip(predicted.iter()).map(|(a, b)| (a - b) * (a - b)).sum();
    let r_squared = determination_coefficient(y, &predicted);

    Ok(CurveFit {
        model,
        result: FitResult::new(coefficients, &covariance, r_squared),
        predicted,
        sse,
        iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_fit_recovers_line_exactly() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y: Vec<f64> = x.iter().map(|v| -1.5 * v + 4.0).collect();
        let fit = fit_curve(ModelKind::Linear, &x, &y, &SolverOptions::default()).unwrap();
        assert!((fit.result.coefficients[0] + 1.5).abs() < 1e-12);
        assert!((fit.result.coefficients[1] - 4.0).abs() < 1e-12);
        assert!((fit.result.r_squared - 1.0).abs() < 1e-12);
        assert_eq!(fit.iterations, 0);
    }

    #[test]
    fn rational_fit_recovers_noise_free_curve() {
        let params = [2313.0, 0.79, 1.03e-3];
        let x: Vec<f64> = (0..200).map(|i| 6.0 * i as f64).collect();
        let y: Vec<f64> = x.iter().map(|&t| predict(ModelKind::Rational, t, &params)).collect();

        let fit = fit_curve(ModelKind::Rational, &x, &y, &SolverOptions::default()).unwrap();
        for (got, want) in fit.result.coefficients.iter().zip(params.iter()) {
            assert!((got - want).abs() <= 1e-6 * want.abs(), "{got} vs {want}");
        }
        assert!((fit.result.r_squared - 1.0).abs() < 1e-9);
        assert_eq!(fit.result.standard_deviations.len(), 3);
        assert_eq!(fit.result.covariance.len(), 3);
    }

    #[test]
    fn rational_fit_with_perturbed_data_converges() {
        let params = [1800.0, 0.5, 2e-3];
        let x: Vec<f64> = (0..120).map(|i| 10.0 * i as f64).collect();
        let y: Vec<f64> = x
            .iter()
            .enumerate()
            .map(|(i, &t)| predict(ModelKind::Rational, t, &params) + if i % 2 == 0 { 0.3 } else { -0.3 })
            .collect();

        let fit = fit_curve(ModelKind::Rational, &x, &y, &SolverOptions::default()).unwrap();
        assert!(fit.result.r_squared > 0.9999);
        assert!(fit.result.standard_deviations.iter().all(|sd| sd.is_finite() && *sd > 0.0));
        assert!((fit.result.coefficients[2] - 2e-3).abs() < 1e-4);
    }

    #[test]
    fn too_few_points_for_rational_model() {
        let err = fit_curve(ModelKind::Rational, &[0.0, 1.0], &[1.0, 2.0], &SolverOptions::default()).unwrap_err();
        assert_eq!(err, NumericError::TooFewPoints { needed: 3, got: 2 });
    }
}
