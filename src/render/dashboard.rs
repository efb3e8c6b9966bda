use std::fmt::Write;

use crate::poller::DashboardSnapshot;
use crate::render::cards::reading_cards;
use crate::render::chart::LineChart;
use crate::render::escape;
use crate::render::layout::{NavItem, PageContext, page};
use crate::sensors::{DataSource, MetricSeries, TimeRange};

pub const LOADING_MESSAGE: &str = r#"<div class="loading">Loading dashboard…</div>"#;

/// Full dashboard page for the chosen range.
#[must_use]
pub fn dashboard_page(
    snapshot: &DashboardSnapshot,
    range: TimeRange,
    series: &[MetricSeries],
    ctx: &PageContext,
) -> String {
    let body = if snapshot.is_loading() {
        LOADING_MESSAGE.to_string()
    } else {
        dashboard_body(snapshot, range, series)
    };
    page("Dashboard", NavItem::Dashboard, ctx, &body)
}

fn dashboard_body(snapshot: &DashboardSnapshot, range: TimeRange, series: &[MetricSeries]) -> String {
    let mut body = String::from("<h2>Dashboard</h2>");

    for warning in &snapshot.warnings {
        let _ = write!(body, r#"<div class="warning">{}</div>"#, escape(warning));
    }

    for reading in &snapshot.readings {
        body.push_str(&reading_cards(reading));
    }

    body.push_str(&range_selector(range));

    body.push_str(r#"<div class="charts">"#);
    for s in series {
        let chart = LineChart::for_metric(s.metric);
        let origin = match s.source {
            DataSource::Live => "",
            DataSource::Mock => r#" <small>(simulated)</small>"#,
        };
        let _ = write!(
            body,
            r#"<div class="chart-panel"><h3>{label} history{origin}</h3>{svg}</div>"#,
            label = s.metric.label(),
            svg = chart.render(&s.points, range),
        );
    }
    body.push_str("</div>");
    body
}

fn range_selector(active: TimeRange) -> String {
    let links: String = TimeRange::ALL
        .into_iter()
        .map(|range| {
            let class = if range == active { r#" class="active""# } else { "" };
            format!(r#"<a href="/?range={range}"{class}>{range}</a>"#)
        })
        .collect();
    format!(r#"<div class="ranges">{links}</div>"#)
}
