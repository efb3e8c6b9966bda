use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, header},
    response::{Html, IntoResponse},
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::common::AppState;
use crate::error::{AppError, AppResult};
use crate::poller::{self, DashboardSnapshot};
use crate::render::dashboard::dashboard_page;
use crate::routes::page_context;
use crate::sensors::{MetricSeries, TimeRange};
use crate::services::history;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RangeQuery {
    /// Time range: 24h, 7d or 30d (default: 24h)
    pub range: Option<String>,
}

impl RangeQuery {
    fn time_range(&self) -> AppResult<TimeRange> {
        match self.range.as_deref().map(str::trim) {
            None | Some("") => Ok(TimeRange::default()),
            Some(raw) => raw.parse().map_err(AppError::BadRequest),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryResponse {
    pub range: TimeRange,
    pub series: Vec<MetricSeries>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    /// False when a newer poll finished first and this one was discarded.
    pub accepted: bool,
    pub snapshot: DashboardSnapshot,
}

/// Dashboard page
pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let range = query.time_range()?;
    let snapshot = state.snapshots.current().await;
    let series = history::series_for_range(&state, range).await;
    let ctx = page_context(&headers, Some(state.config.poll_interval_seconds));

    Ok((
        [(header::CACHE_CONTROL, "no-store")],
        Html(dashboard_page(&snapshot, range, &series, &ctx)),
    ))
}

/// Current dashboard snapshot
#[utoipa::path(
    get,
    path = "/api/snapshot",
    responses(
        (status = 200, description = "Last accepted snapshot", body = DashboardSnapshot),
    ),
    tag = "dashboard"
)]
pub async fn get_snapshot(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    let snapshot = state.snapshots.current().await;
    Json((*snapshot).clone())
}

/// Poll the backend now
#[utoipa::path(
    post,
    path = "/api/refresh",
    responses(
        (status = 200, description = "Poll completed", body = RefreshResponse),
    ),
    tag = "dashboard"
)]
pub async fn refresh(State(state): State<AppState>) -> Json<RefreshResponse> {
    let accepted = poller::poll_once(&state).await;
    let snapshot = state.snapshots.current().await;
    Json(RefreshResponse {
        accepted,
        snapshot: (*snapshot).clone(),
    })
}

/// Series of every metric for a time range
#[utoipa::path(
    get,
    path = "/api/history",
    params(RangeQuery),
    responses(
        (status = 200, description = "Series retrieved", body = HistoryResponse),
        (status = 400, description = "Unknown time range"),
    ),
    tag = "dashboard"
)]
pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<HistoryResponse>> {
    let range = query.time_range()?;
    let series = history::series_for_range(&state, range).await;
    Ok(Json(HistoryResponse { range, series }))
}
