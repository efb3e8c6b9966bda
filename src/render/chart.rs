//! Hand-scaled SVG line charts.

use std::fmt::Write;

use crate::render::escape;
use crate::sensors::{Metric, SeriesPoint, TimeRange};

pub const LOADING_PLACEHOLDER: &str = r#"<div class="chart-loading">Loading chart…</div>"#;

/// Gridlines are drawn at these fractions of the maximum value.
pub const GRID_FRACTIONS: [f64; 4] = [0.25, 0.5, 0.75, 1.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 16.0,
            right: 16.0,
            bottom: 32.0,
            left: 48.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub width: f64,
    pub height: f64,
    pub margins: Margins,
    pub max_value: f64,
    pub unit: String,
    pub color: String,
    pub label: String,
}

impl LineChart {
    #[must_use]
    pub fn for_metric(metric: Metric) -> Self {
        Self {
            width: 600.0,
            height: 240.0,
            margins: Margins::default(),
            max_value: metric.chart_max(),
            unit: metric.unit().to_string(),
            color: metric.color().to_string(),
            label: format!("{} ({})", metric.label(), metric.unit()),
        }
    }

    #[must_use]
    pub fn plot_width(&self) -> f64 {
        self.width - self.margins.left - self.margins.right
    }

    #[must_use]
    pub fn plot_height(&self) -> f64 {
        self.height - self.margins.top - self.margins.bottom
    }

    /// Baseline (value 0) in pixels.
    #[must_use]
    pub fn baseline_y(&self) -> f64 {
        self.height - self.margins.bottom
    }

    /// Pixel position of a value on the y axis, clamped into the plot area.
    #[must_use]
    pub fn y_for(&self, value: f64) -> f64 {
        let max = if self.max_value > 0.0 { self.max_value } else { 1.0 };
        let ratio = (value / max).clamp(0.0, 1.0);
        self.margins.top + self.plot_height() * (1.0 - ratio)
    }

    /// Pixel coordinates of every sample, evenly spread over the plot width.
    ///
    /// Returns `None` for fewer than two samples: there is no spacing to
    /// interpolate over.
    #[must_use]
    pub fn coordinates(&self, values: &[f64]) -> Option<Vec<(f64, f64)>> {
        if values.len() < 2 {
            return None;
        }
        let step = self.plot_width() / (values.len() - 1) as f64;
        Some(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| (self.margins.left + step * i as f64, self.y_for(*v)))
                .collect(),
        )
    }

    /// `(value, y)` of each gridline.
    #[must_use]
    pub fn gridlines(&self) -> Vec<(f64, f64)> {
        GRID_FRACTIONS
            .iter()
            .map(|f| {
                let value = self.max_value * f;
                (value, self.y_for(value))
            })
            .collect()
    }

    /// Render the series as an SVG document fragment, or the loading
    /// placeholder when there is nothing to draw.
    #[must_use]
    pub fn render(&self, points: &[SeriesPoint], range: TimeRange) -> String {
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        let Some(coords) = self.coordinates(&values) else {
            return LOADING_PLACEHOLDER.to_string();
        };

        let mut svg = String::with_capacity(2048);
        let _ = write!(
            svg,
            r#"<svg class="chart" viewBox="0 0 {w} {h}" width="{w}" height="{h}" role="img" aria-label="{label}">"#,
            w = self.width,
            h = self.height,
            label = escape(&self.label),
        );

        svg.push_str(r#"<g class="grid">"#);
        for (value, y) in self.gridlines() {
            let _ = write!(
                svg,
                r##"<line x1="{x1:.1}" y1="{y:.1}" x2="{x2:.1}" y2="{y:.1}" stroke="#e2e8f0"/><text x="{tx:.1}" y="{ty:.1}" text-anchor="end">{value} {unit}</text>"##,
                x1 = self.margins.left,
                x2 = self.width - self.margins.right,
                tx = self.margins.left - 6.0,
                ty = y + 4.0,
                value = self.format_value(value),
                unit = escape(&self.unit),
            );
        }
        svg.push_str("</g>");

        let polyline = coords
            .iter()
            .map(|(x, y)| format!("{x:.1},{y:.1}"))
            .collect::<Vec<_>>()
            .join(" ");

        // Area under the line, closed on the baseline
        if let (Some((first_x, _)), Some((last_x, _))) = (coords.first(), coords.last()) {
            let _ = write!(
                svg,
                r#"<polygon points="{first_x:.1},{base:.1} {polyline} {last_x:.1},{base:.1}" fill="{color}" fill-opacity="0.15" stroke="none"/>"#,
                base = self.baseline_y(),
                color = escape(&self.color),
            );
        }
        let _ = write!(
            svg,
            r#"<polyline points="{polyline}" fill="none" stroke="{color}" stroke-width="2"/>"#,
            color = escape(&self.color),
        );

        svg.push_str(r#"<g class="x-labels">"#);
        let every = range.label_every().max(1);
        for (i, ((x, _), point)) in coords.iter().zip(points).enumerate() {
            if i % every != 0 {
                continue;
            }
            let text = point.timestamp.map_or_else(
                || (i + 1).to_string(),
                |ts| ts.format(range.label_format()).to_string(),
            );
            let _ = write!(
                svg,
                r#"<text x="{x:.1}" y="{y:.1}" text-anchor="middle">{text}</text>"#,
                y = self.baseline_y() + 18.0,
                text = escape(&text),
            );
        }
        svg.push_str("</g></svg>");
        svg
    }

    fn format_value(&self, value: f64) -> String {
        if self.max_value >= 100.0 {
            format!("{value:.0}")
        } else {
            format!("{value:.1}")
        }
    }
}
