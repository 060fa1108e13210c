//! Time derivative of the calibrated conductivity curve.

use crate::domain::Series;
use crate::error::NumericError;
use crate::math::CubicSpline;

/// `dk/dt` at every sample time of `calibrated`, in the same order.
///
/// Needs at least four strictly increasing sample times.
pub fn estimate_derivative(calibrated: &Series) -> Result<Vec<f64>, NumericError> {
    let spline = CubicSpline::not_a_knot(calibrated.time(), calibrated.conductivity())?;
    Ok(spline.knot_derivatives())
}
