//! Model evaluation for the rational conductivity curve and the straight line.
//!
//! The fitter relies on three primitive operations:
//! - predict y(x) given parameters (for R² and calibrated series)
//! - fill a Jacobian row `∂y/∂p` (for Levenberg–Marquardt and covariance)
//! - fill a linearised design row (for a closed-form starting point)
//!
//! These are implemented here for each model kind.

/// Concrete model kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// `y = (a + b·x) / (1 + c·x)`, parameters `[a, b, c]`.
    Rational,
    /// `y = m·x + b`, parameters `[m, b]`.
    Linear,
}

impl ModelKind {
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Rational => "(a + b·t) / (1 + c·t)",
            ModelKind::Linear => "m·x + b",
        }
    }

    pub fn param_count(self) -> usize {
        match self {
            ModelKind::Rational => 3,
            ModelKind::Linear => 2,
        }
    }

    /// Whether the model is linear in its parameters (solved in closed form).
    pub fn is_linear(self) -> bool {
        matches!(self, ModelKind::Linear)
    }
}

/// Predict `y(x)` for the given model kind.
pub fn predict(model: ModelKind, x: f64, params: &[f64]) -> f64 {
    match model {
        ModelKind::Rational => (params[0] + params[1] * x) / (1.0 + params[2] * x),
        ModelKind::Linear => params[0] * x + params[1],
    }
}

/// Fill the Jacobian row `∂y/∂p` at `x`.
///
/// # Panics
/// Panics if `out` or `params` is shorter than `model.param_count()`.
pub fn fill_jacobian_row(model: ModelKind, x: f64, params: &[f64], out: &mut [f64]) {
    match model {
        ModelKind::Rational => {
            let denom = 1.0 + params[2] * x;
            let y = (params[0] + params[1] * x) / denom;
            out[0] = 1.0 / denom;
            out[1] = x / denom;
            out[2] = -x * y / denom;
        }
        ModelKind::Linear => {
            out[0] = x;
            out[1] = 1.0;
        }
    }
}

/// Fill a design row of the problem made linear in the parameters.
///
/// For the rational curve, multiplying through by the denominator gives
/// `y = a + b·x - c·(x·y)`, which ordinary least squares solves directly. The
/// result is exact for noise-free data and a good Levenberg–Marquardt start
/// otherwise.
pub fn fill_linearized_row(model: ModelKind, x: f64, y: f64, out: &mut [f64]) {
    match model {
        ModelKind::Rational => {
            out[0] = 1.0;
            out[1] = x;
            out[2] = -x * y;
        }
        ModelKind::Linear => {
            out[0] = x;
            out[1] = 1.0;
        }
    }
}
