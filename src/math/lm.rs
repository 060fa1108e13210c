//! Levenberg–Marquardt nonlinear least squares.
//!
//! Minimizes `Σ (y_i - f(x_i; p))²` for a model supplied as two closures: the
//! prediction and one Jacobian row `∂f/∂p` at a given `x`.
//!
//! Each damped step solves the augmented linear problem
//!
//! ```text
//! [ J        ]       [ r ]
//! [ √λ · D   ] δ  ≈  [ 0 ]
//! ```
//!
//! by SVD instead of forming `JᵀJ`. `D` holds the Jacobian column norms
//! (Marquardt scaling), which keeps parameters of very different magnitude
//! (an intercept in the thousands next to a rate in 1e-3 1/s) well conditioned.

use nalgebra::{DMatrix, DVector};

use crate::domain::SolverOptions;
use crate::error::NumericError;
use crate::math::solve_least_squares;

const LAMBDA_INIT: f64 = 1e-3;
const LAMBDA_MIN: f64 = 1e-15;
const LAMBDA_MAX: f64 = 1e16;

/// Converged state of a Levenberg–Marquardt run.
#[derive(Debug, Clone)]
pub struct LmSolution {
    pub params: DVector<f64>,
    /// Jacobian evaluated at `params` (used for the covariance estimate).
    pub jacobian: DMatrix<f64>,
    pub sse: f64,
    pub iterations: usize,
}

pub fn levenberg_marquardt<F, G>(
    x: &[f64],
    y: &[f64],
    initial: &[f64],
    predict: F,
    jacobian_row: G,
    opts: &SolverOptions,
) -> Result<LmSolution, NumericError>
where
    F: Fn(f64, &[f64]) -> f64,
    G: Fn(f64, &[f64], &mut [f64]),
{
    let n = x.len();
    let p = initial.len();
    if n < p {
        return Err(NumericError::TooFewPoints { needed: p, got: n });
    }

    let mut params = DVector::from_column_slice(initial);
    let mut residuals = residual_vector(x, y, &params, &predict);
    let mut sse = residuals.norm_squared();
    if !sse.is_finite() {
        return Err(NumericError::NonFinite("residuals at the initial guess".to_string()));
    }
    let mut jacobian = jacobian_matrix(x, &params, &jacobian_row);
    let mut lambda = LAMBDA_INIT;
    let tol = opts.tolerance;

    let solution = |params: DVector<f64>, jacobian: DMatrix<f64>, sse: f64, iterations: usize| LmSolution {
        params,
        jacobian,
        sse,
        iterations,
    };

    for iteration in 1..=opts.max_iterations {
        if sse == 0.0 {
            return Ok(solution(params, jacobian, sse, iteration - 1));
        }

        let scale: Vec<f64> = jacobian
            .column_iter()
            .map(|c| {
                let norm = c.norm();
                if norm > 0.0 && norm.is_finite() { norm } else { 1.0 }
            })
            .collect();

        loop {
            let mut a = DMatrix::<f64>::zeros(n + p, p);
            a.rows_mut(0, n).copy_from(&jacobian);
            for (j, d) in scale.iter().enumerate() {
                a[(n + j, j)] = lambda.sqrt() * d;
            }
            let mut b = DVector::<f64>::zeros(n + p);
            b.rows_mut(0, n).copy_from(&residuals);

            if let Some(step) = solve_least_squares(&a, &b) {
                let candidate = &params + &step;
                let candidate_residuals = residual_vector(x, y, &candidate, &predict);
                let candidate_sse = candidate_residuals.norm_squared();

                if candidate_sse.is_finite() && candidate_sse < sse {
                    let reduction = (sse - candidate_sse) / sse;
                    let small_step = step.norm() <= tol * (params.norm() + tol);

                    params = candidate;
                    residuals = candidate_residuals;
                    sse = candidate_sse;
                    jacobian = jacobian_matrix(x, &params, &jacobian_row);
                    lambda = (lambda / 10.0).max(LAMBDA_MIN);

                    if reduction <= tol || small_step {
                        return Ok(solution(params, jacobian, sse, iteration));
                    }
                    break;
                }
            }

            lambda *= 10.0;
            if lambda > LAMBDA_MAX {
                // No downhill direction left: minimum reached to working precision.
                return Ok(solution(params, jacobian, sse, iteration));
            }
        }
    }

    Err(NumericError::NoConvergence {
        iterations: opts.max_iterations,
    })
}

fn residual_vector<F>(x: &[f64], y: &[f64], params: &DVector<f64>, predict: &F) -> DVector<f64>
where
    F: Fn(f64, &[f64]) -> f64,
{
    let p = params.as_slice();
    DVector::from_iterator(x.len(), x.iter().zip(y.iter()).map(|(&xi, &yi)| yi - predict(xi, p)))
}

fn jacobian_matrix<G>(x: &[f64], params: &DVector<f64>, jacobian_row: &G) -> DMatrix<f64>
where
    G: Fn(f64, &[f64], &mut [f64]),
{
    let p = params.len();
    let mut jacobian = DMatrix::<f64>::zeros(x.len(), p);
    let mut row = vec![0.0; p];
    for (i, &xi) in x.iter().enumerate() {
        jacobian_row(xi, params.as_slice(), &mut row);
        for (j, v) in row.iter().enumerate() {
            jacobian[(i, j)] = *v;
        }
    }
    jacobian
}
