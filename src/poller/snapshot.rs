use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::sensors::{DataSource, Metric, MetricSeries, SensorReading};

/// Everything the dashboard shows, as produced by one poll.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// Sequence number taken when the poll started. 0 means nothing has been
    /// fetched yet.
    pub generation: u64,
    pub fetched_at: Option<DateTime<Utc>>,
    /// Origin of `readings`.
    pub source: DataSource,
    pub readings: Vec<SensorReading>,
    pub series: Vec<MetricSeries>,
    /// Soft warnings shown above the cards.
    pub warnings: Vec<String>,
}

impl DashboardSnapshot {
    #[must_use]
    pub fn loading() -> Self {
        Self {
            generation: 0,
            fetched_at: None,
            source: DataSource::Mock,
            readings: Vec::new(),
            series: Vec::new(),
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.generation == 0
    }

    #[must_use]
    pub fn series(&self, metric: Metric) -> Option<&MetricSeries> {
        self.series.iter().find(|s| s.metric == metric)
    }
}

/// Holds the last accepted snapshot and hands out poll generations.
///
/// A snapshot is only accepted when its generation is newer than the one
/// currently held, so a slow poll that finishes after a faster, later one
/// is discarded.
pub struct SnapshotStore {
    last_generation: AtomicU64,
    current: RwLock<Arc<DashboardSnapshot>>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_generation: AtomicU64::new(0),
            current: RwLock::new(Arc::new(DashboardSnapshot::loading())),
        }
    }

    /// Reserve the generation of a poll that is about to start.
    pub fn begin(&self) -> u64 {
        self.last_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Replace the current snapshot unless it is older than what is held.
    ///
    /// Returns whether the snapshot was accepted.
    pub async fn commit(&self, snapshot: DashboardSnapshot) -> bool {
        let mut current = self.current.write().await;
        if snapshot.generation <= current.generation {
            tracing::debug!(
                generation = snapshot.generation,
                current = current.generation,
                "Discarding stale snapshot"
            );
            return false;
        }
        *current = Arc::new(snapshot);
        true
    }

    pub async fn current(&self) -> Arc<DashboardSnapshot> {
        self.current.read().await.clone()
    }
}
