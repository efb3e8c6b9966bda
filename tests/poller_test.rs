//! Tests for the snapshot poller against an in-process fake backend.
//!
//! Run with: cargo test --test poller_test

mod common;

use chrono::Utc;
use serde_json::{Value, json};
use std::sync::atomic::Ordering;
use std::time::Duration;

use coop_dashboard::backend::BackendClient;
use coop_dashboard::mock::MOCK_DEVICE_ID;
use coop_dashboard::poller::{self, DashboardSnapshot, SnapshotStore, worker};
use coop_dashboard::sensors::{DataSource, Metric};

use common::{
    FakeBackend, config_for, spawn_backend, state_for, state_with, unreachable_backend,
};

fn snapshot_with(generation: u64) -> DashboardSnapshot {
    DashboardSnapshot {
        generation,
        fetched_at: Some(Utc::now()),
        ..DashboardSnapshot::loading()
    }
}

fn devices(count: usize) -> Value {
    Value::Array(
        (1..=count)
            .map(|n| json!({"deviceId": format!("coop-{n}"), "temperature": 20 + n}))
            .collect(),
    )
}

fn hourly_history(samples: usize) -> Value {
    let now = Utc::now().timestamp();
    Value::Array(
        (0..samples)
            .map(|i| json!({"value": 20 + i, "timestamp": now - 3600 * (samples - i) as i64}))
            .collect(),
    )
}

async fn fetch(base_url: &str, cap: Option<usize>) -> DashboardSnapshot {
    let client = BackendClient::new(&config_for(base_url)).unwrap();
    worker::fetch_snapshot(&client, cap, 1, Utc::now()).await
}

#[tokio::test]
async fn store_starts_loading() {
    let store = SnapshotStore::new();
    let current = store.current().await;
    assert!(current.is_loading());
    assert!(current.readings.is_empty());
}

#[tokio::test]
async fn store_discards_overtaken_polls() {
    let store = SnapshotStore::new();
    let slow = store.begin();
    let fast = store.begin();
    assert!(fast > slow);

    assert!(store.commit(snapshot_with(fast)).await);
    assert!(!store.commit(snapshot_with(slow)).await);
    assert_eq!(store.current().await.generation, fast);

    // Re-offering the same generation is also ignored
    assert!(!store.commit(snapshot_with(fast)).await);
}

#[tokio::test]
async fn unreachable_backend_yields_mock_snapshot() {
    let base_url = unreachable_backend().await;
    let snapshot = fetch(&base_url, Some(3)).await;

    assert_eq!(snapshot.source, DataSource::Mock);
    assert_eq!(snapshot.readings.len(), 1);
    let reading = &snapshot.readings[0];
    assert_eq!(reading.device_id, MOCK_DEVICE_ID);
    assert_eq!(reading.temperature, Some(26.4));
    assert_eq!(reading.humidity, Some(63.2));
    assert_eq!(reading.luminosity, Some(540.0));
    assert_eq!(reading.ammonia, Some(12.5));

    // One warning for the readings, one per failed history
    assert_eq!(snapshot.warnings.len(), 5);
    assert!(snapshot.warnings[0].starts_with("Live readings unavailable"));

    assert_eq!(snapshot.series.len(), 4);
    for series in &snapshot.series {
        assert_eq!(series.source, DataSource::Mock);
        assert_eq!(series.points.len(), 24);
    }
}

#[tokio::test]
async fn live_readings_are_capped() {
    let fake = FakeBackend::default();
    *fake.latest.lock().unwrap() = devices(10);
    *fake.history.lock().unwrap() = hourly_history(24);
    let base_url = spawn_backend(fake).await;

    let capped = fetch(&base_url, Some(3)).await;
    assert_eq!(capped.source, DataSource::Live);
    assert_eq!(capped.readings.len(), 3);
    assert_eq!(capped.readings[0].device_id, "coop-1");
    assert!(capped.warnings.is_empty());

    let uncapped = fetch(&base_url, None).await;
    assert_eq!(uncapped.readings.len(), 10);
}

#[tokio::test]
async fn live_history_backs_series() {
    let fake = FakeBackend::default();
    *fake.latest.lock().unwrap() = devices(1);
    *fake.history.lock().unwrap() = hourly_history(24);
    let base_url = spawn_backend(fake.clone()).await;

    let snapshot = fetch(&base_url, Some(3)).await;

    for metric in Metric::ALL {
        let series = snapshot.series(metric).unwrap();
        assert_eq!(series.source, DataSource::Live, "{metric}");
        assert_eq!(series.points.len(), 24);
        assert_eq!(series.points[0].value, 20.0);
    }
    // latest + one history request per metric
    assert_eq!(fake.sensor_requests.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn single_sample_history_falls_back_to_mock() {
    let fake = FakeBackend::default();
    *fake.latest.lock().unwrap() = devices(2);
    *fake.history.lock().unwrap() = hourly_history(1);
    let base_url = spawn_backend(fake).await;

    let snapshot = fetch(&base_url, Some(3)).await;

    assert_eq!(snapshot.source, DataSource::Live);
    assert_eq!(snapshot.warnings.len(), 4);
    assert!(snapshot.warnings[0].contains("only 1 sample(s) returned"));
    assert!(snapshot.series.iter().all(|s| s.source == DataSource::Mock));
}

#[tokio::test]
async fn history_errors_carry_backend_message() {
    let fake = FakeBackend::default();
    *fake.latest.lock().unwrap() = devices(1);
    let base_url = spawn_backend(fake).await;

    let snapshot = fetch(&base_url, Some(3)).await;

    assert_eq!(snapshot.source, DataSource::Live);
    assert_eq!(snapshot.warnings.len(), 4);
    assert!(
        snapshot
            .warnings
            .iter()
            .all(|w| w.contains("sensor gateway offline"))
    );
}

#[tokio::test]
async fn empty_latest_response_is_a_failure() {
    let fake = FakeBackend::default();
    *fake.latest.lock().unwrap() = json!({"data": []});
    *fake.history.lock().unwrap() = hourly_history(24);
    let base_url = spawn_backend(fake).await;

    let snapshot = fetch(&base_url, Some(3)).await;

    assert_eq!(snapshot.source, DataSource::Mock);
    assert_eq!(snapshot.readings[0].device_id, MOCK_DEVICE_ID);
    assert_eq!(snapshot.warnings.len(), 1);
}

#[tokio::test]
async fn poll_once_publishes_snapshot() {
    let fake = FakeBackend::default();
    *fake.latest.lock().unwrap() = devices(2);
    *fake.history.lock().unwrap() = hourly_history(24);
    let state = state_for(&spawn_backend(fake).await);

    assert!(poller::poll_once(&state).await);
    let first = state.snapshots.current().await;
    assert_eq!(first.generation, 1);
    assert_eq!(first.readings.len(), 2);

    assert!(poller::poll_once(&state).await);
    assert_eq!(state.snapshots.current().await.generation, 2);
}

#[tokio::test]
async fn spawned_poller_polls_immediately_and_stops() {
    let fake = FakeBackend::default();
    *fake.latest.lock().unwrap() = devices(1);
    *fake.history.lock().unwrap() = hourly_history(24);
    let mut config = config_for(&spawn_backend(fake.clone()).await);
    config.poll_interval_seconds = 1;
    let state = state_with(config);

    let handle = poller::spawn(state.clone());
    assert!(handle.is_running());

    let mut published = false;
    for _ in 0..50 {
        if !state.snapshots.current().await.is_loading() {
            published = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(published, "poller never published a snapshot");

    handle.stop();
    tokio::time::sleep(Duration::from_millis(50)).await;
    let requests_at_stop = fake.sensor_requests.load(Ordering::SeqCst);
    let generation_at_stop = state.snapshots.current().await.generation;

    // Well past the next tick: nothing may poll any more
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(fake.sensor_requests.load(Ordering::SeqCst), requests_at_stop);
    assert_eq!(state.snapshots.current().await.generation, generation_at_stop);
}

#[tokio::test]
async fn running_poller_keeps_polling_on_interval() {
    let fake = FakeBackend::default();
    *fake.latest.lock().unwrap() = devices(1);
    *fake.history.lock().unwrap() = hourly_history(24);
    let mut config = config_for(&spawn_backend(fake).await);
    config.poll_interval_seconds = 1;
    let state = state_with(config);

    let _handle = poller::spawn(state.clone());
    tokio::time::sleep(Duration::from_millis(1500)).await;

    // Immediate poll plus at least one tick
    assert!(state.snapshots.current().await.generation >= 2);
}
