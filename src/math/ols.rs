//! Linear least squares and parameter covariance.
//!
//! Every regression in this project reduces to small problems of the form:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! either directly (the derivative and Arrhenius lines) or as one damped step of
//! the Levenberg–Marquardt iteration (the conductivity curve).
//!
//! Implementation choices:
//! - We use SVD to solve the least-squares problem robustly even when
//!   the design matrix is tall (more rows than columns).
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - Covariance is the unweighted estimate `pinv(JᵀJ) · SSE / (n - p)`, with
//!   the residual variance taken from the fit itself.

use nalgebra::{DMatrix, DVector};

use crate::error::NumericError;

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Parameter covariance from the Jacobian at the solution and the residual sum of squares.
///
/// When there are no residual degrees of freedom (`n <= p`) the variance is
/// undefined and every entry is `+∞`.
pub fn covariance_from_jacobian(jacobian: &DMatrix<f64>, sse: f64) -> DMatrix<f64> {
    let (n, p) = jacobian.shape();
    if n <= p || !sse.is_finite() {
        return DMatrix::from_element(p, p, f64::INFINITY);
    }

    let svd = jacobian.clone().svd(false, true);
    let Some(v_t) = svd.v_t else {
        return DMatrix::from_element(p, p, f64::INFINITY);
    };

    // Discard directions the data cannot resolve (same cutoff as a pseudo-inverse).
    let s_max = svd.singular_values.max();
    let cutoff = f64::EPSILON * n.max(p) as f64 * s_max;
    let inv_s2 = svd
        .singular_values
        .map(|s| if s > cutoff { 1.0 / (s * s) } else { 0.0 });

    let scaled = DMatrix::from_diagonal(&inv_s2) * &v_t;
    let pinv = v_t.transpose() * scaled;
    pinv * (sse / (n - p) as f64)
}

/// Output of an ordinary least-squares fit.
#[derive(Debug, Clone)]
pub struct LinearFit {
    pub coefficients: DVector<f64>,
    pub covariance: DMatrix<f64>,
    pub sse: f64,
}

/// Fit `y ≈ X β` and estimate the covariance of `β`.
pub fn fit_linear(design: &DMatrix<f64>, y: &DVector<f64>) -> Result<LinearFit, NumericError> {
    let (n, p) = design.shape();
    if n < p {
        return Err(NumericError::TooFewPoints { needed: p, got: n });
    }
    let coefficients = solve_least_squares(design, y).ok_or(NumericError::Singular)?;
    let sse = (y - design * &coefficients).norm_squared();
    if !sse.is_finite() {
        return Err(NumericError::NonFinite("linear fit residuals".to_string()));
    }
    let covariance = covariance_from_jacobian(design, sse);
    Ok(LinearFit {
        coefficients,
        covariance,
        sse,
    })
}
