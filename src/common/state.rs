use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::BackendClient;
use crate::config::Config;
use crate::poller::SnapshotStore;
use crate::sensors::{HistoricalPoint, TimeRange};
use crate::users::UserDirectory;

/// Synthetic histories per range, kept for one poll interval so charts don't
/// reshuffle their jitter on every page load.
pub type HistoryCache = Cache<TimeRange, Arc<Vec<HistoricalPoint>>>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: Arc<BackendClient>,
    pub snapshots: Arc<SnapshotStore>,
    pub users: Arc<UserDirectory>,
    pub history_cache: HistoryCache,
}

impl AppState {
    pub fn new(config: Config, client: BackendClient) -> Self {
        let history_cache: HistoryCache = Cache::builder()
            .max_capacity(TimeRange::ALL.len() as u64)
            .time_to_live(Duration::from_secs(config.poll_interval_seconds))
            .build();

        let client = Arc::new(client);

        Self {
            config: Arc::new(config),
            users: Arc::new(UserDirectory::new(client.clone())),
            client,
            snapshots: Arc::new(SnapshotStore::new()),
            history_cache,
        }
    }
}
