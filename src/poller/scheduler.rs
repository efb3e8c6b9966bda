use chrono::Utc;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{MissedTickBehavior, interval};

use crate::common::AppState;
use crate::poller::worker;

/// Running poller. Dropping or stopping it cancels the interval and every
/// fetch still in flight.
pub struct PollerHandle {
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn stop(self) {
        self.task.abort();
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start polling: one fetch right away, then one per interval.
#[must_use]
pub fn spawn(state: AppState) -> PollerHandle {
    PollerHandle {
        task: tokio::spawn(run(state)),
    }
}

async fn run(state: AppState) {
    let period = state.config.poll_interval();
    tracing::info!(
        interval_secs = period.as_secs(),
        backend = %state.client.base_url(),
        sensor_cap = ?state.config.sensor_cap,
        "Starting sensor poller"
    );

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Owned here so aborting the loop aborts in-flight polls as well
    let mut in_flight = JoinSet::new();

    loop {
        // First tick completes immediately
        ticker.tick().await;

        while let Some(finished) = in_flight.try_join_next() {
            if let Err(e) = finished {
                tracing::error!(error = %e, "Poll task failed");
            }
        }
        if !in_flight.is_empty() {
            tracing::debug!(in_flight = in_flight.len(), "Previous poll still running");
        }

        let state = state.clone();
        in_flight.spawn(async move {
            poll_once(&state).await;
        });
    }
}

/// Run a single poll and offer its snapshot to the store.
///
/// Returns whether the snapshot was accepted; a poll overtaken by a newer one
/// is discarded.
pub async fn poll_once(state: &AppState) -> bool {
    let generation = state.snapshots.begin();
    tracing::debug!(generation, "Polling backend");

    let snapshot = worker::fetch_snapshot(
        &state.client,
        state.config.sensor_cap,
        generation,
        Utc::now(),
    )
    .await;
    let warnings = snapshot.warnings.len();
    let readings = snapshot.readings.len();

    let accepted = state.snapshots.commit(snapshot).await;
    if accepted {
        tracing::debug!(generation, readings, warnings, "Snapshot updated");
    }
    accepted
}
