use std::fmt::Write;

use crate::render::escape;
use crate::sensors::{Level, Metric, SensorReading};

/// Display level of an optional value; missing values are never alarming.
#[must_use]
pub fn level_of(metric: Metric, value: Option<f64>) -> Level {
    value.map_or(Level::Normal, |v| metric.classify(v))
}

/// One metric card. Missing values show an em dash.
#[must_use]
pub fn sensor_card(metric: Metric, value: Option<f64>, hint: Option<&str>) -> String {
    let level = level_of(metric, value);
    let shown = value.map_or_else(|| "—".to_string(), |v| format!("{v:.1}"));

    let mut html = format!(
        r#"<div class="card {class}" data-metric="{metric}"><div class="card-title">{title}</div><div class="card-value">{shown} {unit}</div>"#,
        class = level.css_class(),
        title = metric.label(),
        unit = escape(metric.unit()),
    );
    if let Some(hint) = hint {
        let _ = write!(html, r#"<div class="card-hint">{}</div>"#, escape(hint));
    }
    html.push_str("</div>");
    html
}

/// Every metric card of one device, under its id.
#[must_use]
pub fn reading_cards(reading: &SensorReading) -> String {
    let hint = format!("Updated {}", reading.timestamp.format("%H:%M:%S UTC"));
    let cards: String = Metric::ALL
        .into_iter()
        .map(|metric| sensor_card(metric, reading.value(metric), Some(&hint)))
        .collect();

    format!(
        r#"<section class="device"><h3>{id}</h3><div class="cards">{cards}</div></section>"#,
        id = escape(&reading.device_id),
    )
}
