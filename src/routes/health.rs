use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::common::AppState;
use crate::sensors::DataSource;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Generation of the snapshot on display (0 before the first poll lands).
    pub snapshot_generation: u64,
    pub data_source: DataSource,
    pub fetched_at: Option<DateTime<Utc>>,
}

/// Health check endpoint
///
/// Returns 200 OK while the service is running, whether the backend answers
/// or mock data is being shown. Not rate-limited.
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    ),
    tag = "health"
)]
pub async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.snapshots.current().await;
    Json(HealthResponse {
        status: "ok",
        snapshot_generation: snapshot.generation,
        data_source: snapshot.source,
        fetched_at: snapshot.fetched_at,
    })
}
