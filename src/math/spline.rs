//! Cubic interpolating spline with not-a-knot end conditions.
//!
//! The spline is stored by its knot values `y_i` and second derivatives `M_i`.
//! On segment `[x_i, x_{i+1}]` with `h = x_{i+1} - x_i`, `A = (x_{i+1} - t)/h`
//! and `B = (t - x_i)/h`:
//!
//! ```text
//! S(t)  = A y_i + B y_{i+1} + ((A³ - A) M_i + (B³ - B) M_{i+1}) h² / 6
//! S'(t) = (y_{i+1} - y_i)/h - (3A² - 1) h M_i / 6 + (3B² - 1) h M_{i+1} / 6
//! ```
//!
//! Not-a-knot (third derivative continuous at `x_1` and `x_{n-2}`) is what an
//! interpolating cubic B-spline with knots at the interior data points gives, and
//! it reproduces cubic polynomials exactly. `M_0` and `M_{n-1}` are eliminated
//! from the first and last interior equations so the remaining system is
//! tridiagonal.

use crate::error::NumericError;

/// Smallest number of knots that determines a cubic.
pub const MIN_SPLINE_POINTS: usize = 4;

#[derive(Debug, Clone)]
pub struct CubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    second: Vec<f64>,
}

impl CubicSpline {
    pub fn not_a_knot(x: &[f64], y: &[f64]) -> Result<Self, NumericError> {
        let n = x.len();
        if y.len() != n {
            return Err(NumericError::NonFinite(format!(
                "spline abscissae ({n}) and ordinates ({}) differ in length",
                y.len()
            )));
        }
        if n < MIN_SPLINE_POINTS {
            return Err(NumericError::TooFewPoints {
                needed: MIN_SPLINE_POINTS,
                got: n,
            });
        }
        if let Some(i) = x.windows(2).position(|w| !(w[1] > w[0])) {
            return Err(NumericError::NotIncreasing { index: i + 1 });
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(NumericError::NonFinite("spline input".to_string()));
        }

        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
        let slope: Vec<f64> = y.windows(2).zip(h.iter()).map(|(w, hi)| (w[1] - w[0]) / hi).collect();

        // Unknowns M_1 ..= M_{n-2}.
        let m = n - 2;
        let mut lower = vec![0.0; m];
        let mut diag = vec![0.0; m];
        let mut upper = vec![0.0; m];
        let mut rhs = vec![0.0; m];
        for r in 0..m {
            let i = r + 1;
            lower[r] = h[i - 1];
            diag[r] = 2.0 * (h[i - 1] + h[i]);
            upper[r] = h[i];
            rhs[r] = 6.0 * (slope[i] - slope[i - 1]);
        }

        // Left: M_0 = ((h0 + h1) M_1 - h0 M_2) / h1.
        let (h0, h1) = (h[0], h[1]);
        lower[0] = 0.0;
        diag[0] = (h0 + h1) * (h0 + 2.0 * h1) / h1;
        upper[0] = (h1 * h1 - h0 * h0) / h1;

        // Right: M_{n-1} = ((a + b) M_{n-2} - b M_{n-3}) / a.
        let (a, b) = (h[n - 3], h[n - 2]);
        lower[m - 1] = (a * a - b * b) / a;
        diag[m - 1] = (a + b) * (2.0 * a + b) / a;
        upper[m - 1] = 0.0;

        let interior = solve_tridiagonal(&lower, &diag, &upper, &rhs)?;

        let mut second = vec![0.0; n];
        second[1..n - 1].copy_from_slice(&interior);
        second[0] = ((h0 + h1) * second[1] - h0 * second[2]) / h1;
        second[n - 1] = ((a + b) * second[n - 2] - b * second[n - 3]) / a;

        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            second,
        })
    }

    pub fn value_at(&self, t: f64) -> f64 {
        let (i, h, a, b) = self.locate(t);
        a * self.y[i]
            + b * self.y[i + 1]
            + ((a * a * a - a) * self.second[i] + (b * b * b - b) * self.second[i + 1]) * h * h / 6.0
    }

    pub fn derivative_at(&self, t: f64) -> f64 {
        let (i, h, a, b) = self.locate(t);
        (self.y[i + 1] - self.y[i]) / h - (3.0 * a * a - 1.0) * h * self.second[i] / 6.0
            + (3.0 * b * b - 1.0) * h * self.second[i + 1] / 6.0
    }

    /// `S'(x_i)` at every knot, in knot order.
    pub fn knot_derivatives(&self) -> Vec<f64> {
        self.x.iter().map(|&t| self.derivative_at(t)).collect()
    }

    /// Segment index and local coordinates; outside the knot range the end
    /// cubic is extrapolated.
    fn locate(&self, t: f64) -> (usize, f64, f64, f64) {
        let last = self.x.len() - 2;
        let i = self.x.partition_point(|&xi| xi <= t).saturating_sub(1).min(last);
        let h = self.x[i + 1] - self.x[i];
        let a = (self.x[i + 1] - t) / h;
        let b = (t - self.x[i]) / h;
        (i, h, a, b)
    }
}

/// Thomas algorithm. `lower[0]` and `upper[m-1]` are ignored.
fn solve_tridiagonal(lower: &[f64], diag: &[f64], upper: &[f64], rhs: &[f64]) -> Result<Vec<f64>, NumericError> {
    let m = diag.len();
    let mut c = vec![0.0; m];
    let mut d = vec![0.0; m];

    let mut pivot = diag[0];
    if pivot == 0.0 || !pivot.is_finite() {
        return Err(NumericError::Singular);
    }
    c[0] = upper[0] / pivot;
    d[0] = rhs[0] / pivot;
    for r in 1..m {
        pivot = diag[r] - lower[r] * c[r - 1];
        if pivot == 0.0 || !pivot.is_finite() {
            return Err(NumericError::Singular);
        }
        c[r] = if r + 1 < m { upper[r] / pivot } else { 0.0 };
        d[r] = (rhs[r] - lower[r] * d[r - 1]) / pivot;
    }

    let mut out = vec![0.0; m];
    out[m - 1] = d[m - 1];
    for r in (0..m - 1).rev() {
        out[r] = d[r] - c[r] * out[r + 1];
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cubic(t: f64) -> f64 {
        2.0 - 3.0 * t + 0.5 * t * t - 0.25 * t * t * t
    }

    fn cubic_prime(t: f64) -> f64 {
        -3.0 + t - 0.75 * t * t
    }

    #[test]
    fn reproduces_cubic_polynomials_on_uneven_grid() {
        let x = [0.0, 0.3, 1.1, 1.5, 2.6, 3.0, 4.2];
        let y: Vec<f64> = x.iter().map(|&t| cubic(t)).collect();
        let spline = CubicSpline::not_a_knot(&x, &y).unwrap();

        for (t, d) in x.iter().zip(spline.knot_derivatives()) {
            assert!((d - cubic_prime(*t)).abs() < 1e-9, "t={t}: {d} vs {}", cubic_prime(*t));
        }
        for t in [0.1, 0.77, 2.0, 3.9] {
            assert!((spline.value_at(t) - cubic(t)).abs() < 1e-9);
            assert!((spline.derivative_at(t) - cubic_prime(t)).abs() < 1e-9);
        }
    }

    #[test]
    fn four_points_give_the_interpolating_cubic() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y: Vec<f64> = x.iter().map(|&t| cubic(t)).collect();
        let spline = CubicSpline::not_a_knot(&x, &y).unwrap();
        assert!((spline.derivative_at(1.5) - cubic_prime(1.5)).abs() < 1e-10);
    }

    #[test]
    fn smooth_function_derivative_is_accurate() {
        let x: Vec<f64> = (0..101).map(|i| i as f64 * 0.05).collect();
        let y: Vec<f64> = x.iter().map(|t| t.sin()).collect();
        let spline = CubicSpline::not_a_knot(&x, &y).unwrap();
        for (t, d) in x.iter().zip(spline.knot_derivatives()) {
            assert!((d - t.cos()).abs() < 1e-4);
        }
    }

    #[test]
    fn requires_four_increasing_points() {
        assert_eq!(
            CubicSpline::not_a_knot(&[0.0, 1.0, 2.0], &[1.0, 2.0, 3.0]).unwrap_err(),
            NumericError::TooFewPoints { needed: 4, got: 3 }
        );
        assert_eq!(
            CubicSpline::not_a_knot(&[0.0, 1.0, 1.0, 2.0], &[1.0, 2.0, 3.0, 4.0]).unwrap_err(),
            NumericError::NotIncreasing { index: 2 }
        );
    }
}
