//! Arrhenius calibration chart.
//!
//! Observed points `(1/T, ln k)` are drawn as black circles and the fitted line
//! `ln k = m·(1/T) + b` in blue across the observed `1/T` range. Output is SVG.

use std::error::Error;
use std::path::Path;

use plotters::prelude::*;
use tracing::info;

use crate::error::AppError;

const SIZE: (u32, u32) = (800, 600);

/// Render-only description of one Arrhenius chart.
#[derive(Debug, Clone, Copy)]
pub struct ArrheniusChart<'a> {
    pub inverse_temperatures: &'a [f64],
    pub log_rate_constants: &'a [f64],
    /// `[slope, intercept]`.
    pub coefficients: &'a [f64],
}

impl ArrheniusChart<'_> {
    fn line(&self) -> Option<[(f64, f64); 2]> {
        let (&m, &b) = (self.coefficients.first()?, self.coefficients.get(1)?);
        let (x0, x1) = span(self.inverse_temperatures)?;
        Some([(x0, m * x0 + b), (x1, m * x1 + b)])
    }

    /// Padded `(x, y)` bounds covering points and line.
    fn bounds(&self) -> Option<((f64, f64), (f64, f64))> {
        let line = self.line()?;
        let ys: Vec<f64> = self
            .log_rate_constants
            .iter()
            .copied()
            .chain(line.iter().map(|p| p.1))
            .collect();
        Some((pad(span(self.inverse_temperatures)?), pad(span(&ys)?)))
    }
}

fn span(values: &[f64]) -> Option<(f64, f64)> {
    let mut finite = values.iter().copied().filter(|v| v.is_finite());
    let first = finite.next()?;
    Some(finite.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}

fn pad((lo, hi): (f64, f64)) -> (f64, f64) {
    let width = hi - lo;
    let margin = if width > 0.0 { 0.05 * width } else { 1e-6_f64.max(1e-3 * lo.abs()) };
    (lo - margin, hi + margin)
}

/// Draw the chart to an SVG file.
pub fn draw_arrhenius_chart(path: &Path, chart: &ArrheniusChart<'_>) -> Result<(), AppError> {
    let (Some(line), Some((x_range, y_range))) = (chart.line(), chart.bounds()) else {
        return Err(AppError::InvalidArgument(
            "Arrhenius chart needs two coefficients and at least one finite point".to_string(),
        ));
    };

    draw(path, chart, line, x_range, y_range)
        .map_err(|e| AppError::io(format!("failed to draw chart '{}'", path.display()), e))?;
    info!(path = %path.display(), "chart written");
    Ok(())
}

fn draw(
    path: &Path,
    chart: &ArrheniusChart<'_>,
    line: [(f64, f64); 2],
    (x0, x1): (f64, f64),
    (y0, y1): (f64, f64),
) -> Result<(), Box<dyn Error>> {
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut ctx = ChartBuilder::on(&root)
        .margin(20)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 45)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    ctx.configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc("1/T")
        .y_desc("ln k")
        .x_labels(6)
        .y_labels(6)
        .x_label_formatter(&|v| format!("{v:.6}"))
        .y_label_formatter(&|v| format!("{v:.3}"))
        .label_style(("sans-serif", 8))
        .draw()?;

    ctx.draw_series(
        chart
            .inverse_temperatures
            .iter()
            .zip(chart.log_rate_constants)
            .map(|(&x, &y)| Circle::new((x, y), 4, BLACK.filled())),
    )?;
    ctx.draw_series(LineSeries::new(line, &BLUE))?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_svg_with_axis_descriptions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.svg");
        let inverse: Vec<f64> = [298.15, 299.15, 301.15].iter().map(|t| 1.0 / t).collect();
        let log_k: Vec<f64> = inverse.iter().map(|x| -5400.0 * x + 14.0).collect();
        let chart = ArrheniusChart {
            inverse_temperatures: &inverse,
            log_rate_constants: &log_k,
            coefficients: &[-5400.0, 14.0],
        };

        draw_arrhenius_chart(&path, &chart).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("1/T"));
        assert!(svg.contains("ln k"));
    }

    #[test]
    fn missing_coefficients_are_rejected() {
        let chart = ArrheniusChart {
            inverse_temperatures: &[0.003],
            log_rate_constants: &[-2.0],
            coefficients: &[],
        };
        let err = draw_arrhenius_chart(Path::new("unused.svg"), &chart).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[test]
    fn single_point_still_gets_a_nonempty_range() {
        let chart = ArrheniusChart {
            inverse_temperatures: &[0.0033],
            log_rate_constants: &[-2.0],
            coefficients: &[-5400.0, 15.82],
        };
        let ((x0, x1), (y0, y1)) = chart.bounds().unwrap();
        assert!(x1 > x0 && y1 > y0);
    }
}
