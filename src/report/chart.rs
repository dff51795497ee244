use std::ops::Range;

use plotters::coord::Shift;
use plotters::prelude::*;

use super::{ReportError, ReportResult};

const SIZE: (u32, u32) = (640, 480);

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

/// Line chart rendered to SVG. The y axis always starts at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

impl LineChart {
    fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.series
            .iter()
            .flat_map(|s| s.points.iter().copied())
            .filter(|p| p.0.is_finite() && p.1.is_finite())
    }

    /// Plot ranges: the x extent of all points, and `0 .. 1.1 * max(y)`.
    fn bounds(&self) -> (Range<f64>, Range<f64>) {
        let (mut x_min, mut x_max, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY, 0.0f64);
        for (x, y) in self.points() {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_max = y_max.max(y);
        }
        if !x_min.is_finite() {
            (x_min, x_max) = (0.0, 1.0);
        } else if x_min == x_max {
            (x_min, x_max) = (x_min - 1.0, x_max + 1.0);
        }
        let y_max = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };
        (x_min..x_max, 0.0..y_max)
    }

    pub fn to_svg(&self) -> ReportResult<String> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, SIZE).into_drawing_area();
            self.draw(&root).map_err(|err| ReportError::Plot(err.to_string()))?;
        }
        Ok(svg)
    }

    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        root.fill(&WHITE)?;
        let (x_range, y_range) = self.bounds();
        let mut chart = ChartBuilder::on(root)
            .caption(&self.title, ("sans-serif", 20))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(65)
            .build_cartesian_2d(x_range, y_range)?;

        chart
            .configure_mesh()
            .x_desc(&self.x_label)
            .y_desc(&self.y_label)
            .x_label_formatter(&|x| format!("{x:.0}"))
            .draw()?;

        for (index, series) in self.series.iter().enumerate() {
            let color = Palette99::pick(index).to_rgba();
            chart
                .draw_series(LineSeries::new(
                    series.points.iter().copied(),
                    color.stroke_width(2),
                ))?
                .label(series.label.as_str())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
            chart.draw_series(
                series
                    .points
                    .iter()
                    .map(|&point| Circle::new(point, 3, color.filled())),
            )?;
        }

        if self.series.len() > 1 {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }

        root.present()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(series: Vec<Series>) -> LineChart {
        LineChart {
            title: "FHE Evaluation of Chebyshev Approximations".into(),
            x_label: "Degree".into(),
            y_label: "Runtime (s)".into(),
            series,
        }
    }

    #[test]
    fn renders_title_labels_and_points() {
        let svg = chart(vec![Series {
            label: "Chebyshev".into(),
            points: vec![(2.0, 0.5), (4.0, 1.0), (6.0, 1.5)],
        }])
        .to_svg()
        .unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("FHE Evaluation of Chebyshev Approximations"));
        assert!(svg.contains("Degree"));
        assert!(svg.contains("Runtime (s)"));
        assert_eq!(svg.matches("<circle").count(), 3);
    }

    #[test]
    fn y_axis_starts_at_zero() {
        let c = chart(vec![Series {
            label: "a".into(),
            points: vec![(2.0, 3.0), (10.0, 5.0)],
        }]);
        let (x, y) = c.bounds();
        assert_eq!(x, 2.0..10.0);
        assert_eq!(y.start, 0.0);
        assert!(y.end > 5.0);
    }

    #[test]
    fn legend_lists_every_series() {
        let svg = chart(vec![
            Series {
                label: "Chebyshev".into(),
                points: vec![(2.0, 1.0), (4.0, 2.0)],
            },
            Series {
                label: "Minimax".into(),
                points: vec![(2.0, 2.0), (4.0, 3.0)],
            },
        ])
        .to_svg()
        .unwrap();
        assert!(svg.contains("Chebyshev"));
        assert!(svg.contains("Minimax"));
    }

    #[test]
    fn empty_chart_still_renders() {
        let c = chart(Vec::new());
        assert_eq!(c.bounds(), (0.0..1.0, 0.0..1.0));
        assert!(c.to_svg().unwrap().contains("</svg>"));
    }
}
