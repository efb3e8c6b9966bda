use chrono::Utc;
use std::sync::Arc;

use crate::common::AppState;
use crate::mock;
use crate::sensors::{DataSource, HistoricalPoint, Metric, MetricSeries, TimeRange};

/// Series of every metric for a dashboard time range.
///
/// The 24h range is served from the polled snapshot (live where the backend
/// delivered, mock otherwise). The backend offers no ranged history, so 7d
/// and 30d always come from the generator.
pub async fn series_for_range(state: &AppState, range: TimeRange) -> Vec<MetricSeries> {
    if range == TimeRange::Day {
        let snapshot = state.snapshots.current().await;
        if !snapshot.is_loading() && !snapshot.series.is_empty() {
            return snapshot.series.clone();
        }
    }

    let history = mock_history(state, range).await;
    Metric::ALL
        .into_iter()
        .map(|metric| MetricSeries::from_history(metric, DataSource::Mock, &history))
        .collect()
}

/// Synthetic history for `range`, generated at most once per cache TTL.
pub async fn mock_history(state: &AppState, range: TimeRange) -> Arc<Vec<HistoricalPoint>> {
    state
        .history_cache
        .get_with(range, async move {
            tracing::debug!(%range, "Generating mock history");
            Arc::new(mock::generate_history(range, Utc::now()))
        })
        .await
}
