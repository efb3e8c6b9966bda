use chrono::{DateTime, Utc};
use futures::future::join_all;

use crate::backend::BackendClient;
use crate::error::AppError;
use crate::mock;
use crate::sensors::{DataSource, Metric, MetricSeries, TimeRange, apply_cap};

use super::snapshot::DashboardSnapshot;

/// Samples requested per metric; the live series backs the 24h chart.
pub const HISTORY_LIMIT: usize = TimeRange::Day.point_count();

/// Fetch latest readings and every metric's series, substituting mock data
/// for whatever fails.
///
/// Never fails: errors are logged and turned into warnings on the snapshot.
pub async fn fetch_snapshot(
    client: &BackendClient,
    sensor_cap: Option<usize>,
    generation: u64,
    now: DateTime<Utc>,
) -> DashboardSnapshot {
    let history_requests = Metric::ALL.map(|metric| client.get_history(metric, HISTORY_LIMIT));
    let (latest, histories) = tokio::join!(client.get_latest(), join_all(history_requests));

    let mut warnings = Vec::new();

    let (source, mut readings) = match latest {
        Ok(readings) => (DataSource::Live, readings),
        Err(e) => {
            tracing::warn!(error = %e, generation, "Latest readings unavailable, using mock snapshot");
            warnings.push(format!(
                "Live readings unavailable ({}); showing simulated values.",
                e.user_message()
            ));
            (DataSource::Mock, vec![mock::mock_latest(now)])
        }
    };
    apply_cap(&mut readings, sensor_cap);

    let series = Metric::ALL
        .into_iter()
        .zip(histories)
        .map(|(metric, result)| {
            let failure = match result {
                Ok(points) if points.len() >= 2 => {
                    return MetricSeries {
                        metric,
                        source: DataSource::Live,
                        points,
                    };
                }
                Ok(points) => AppError::Backend(format!("only {} sample(s) returned", points.len())),
                Err(e) => e,
            };

            tracing::warn!(error = %failure, %metric, generation, "History unavailable, using mock series");
            warnings.push(format!(
                "{} history unavailable ({}); showing simulated values.",
                metric.label(),
                failure.user_message()
            ));
            mock::mock_series(metric, TimeRange::Day, now)
        })
        .collect();

    DashboardSnapshot {
        generation,
        fetched_at: Some(now),
        source,
        readings,
        series,
        warnings,
    }
}
