pub mod admin;
pub mod dashboard;
pub mod health;
mod rate_limit;
pub mod users;

use axum::{
    Router,
    http::{HeaderMap, header},
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use rate_limit::{ClientIpKeyExtractor, client_ip};

use crate::common::AppState;
use crate::render::layout::{PageContext, user_from_cookies};

/// Page options derived from the request: logged-in marker and auto-refresh.
#[must_use]
pub fn page_context(headers: &HeaderMap, refresh_secs: Option<u64>) -> PageContext {
    let user = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(user_from_cookies);

    PageContext { user, refresh_secs }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        dashboard::get_snapshot,
        dashboard::refresh,
        dashboard::get_history,
        users::list_users,
        users::create_user,
        users::update_user,
        users::delete_user,
        users::user_stats,
    ),
    components(
        schemas(
            health::HealthResponse,
            dashboard::HistoryResponse,
            dashboard::RefreshResponse,
            crate::poller::DashboardSnapshot,
            crate::sensors::SensorReading,
            crate::sensors::MetricSeries,
            crate::sensors::SeriesPoint,
            crate::sensors::Metric,
            crate::sensors::DataSource,
            crate::sensors::TimeRange,
            users::UsersResponse,
            crate::users::User,
            crate::users::UserForm,
            crate::users::UserStats,
            crate::users::Role,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "dashboard", description = "Sensor snapshot and history"),
        (name = "users", description = "User administration"),
    ),
    info(
        title = "Coop Dashboard API",
        description = "Monitoring dashboard and user administration for a connected poultry farm",
        version = "0.1.0"
    )
)]
struct ApiDoc;

pub fn build_router(state: AppState) -> Router {
    let config = &state.config;

    // Pages and read-only data: never rate limited
    let public_routes = Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/logout", post(admin::logout))
        .route("/api/snapshot", get(dashboard::get_snapshot))
        .route("/api/history", get(dashboard::get_history));

    // Everything that reaches the backend on demand
    let admin_routes_base = Router::new()
        .route(
            "/users",
            get(admin::users_page_handler).post(admin::create_user_form),
        )
        .route("/users/{id}", post(admin::update_user_form))
        .route("/users/{id}/delete", post(admin::delete_user_form))
        .route("/api/refresh", post(dashboard::refresh))
        .route(
            "/api/users",
            get(users::list_users).post(users::create_user),
        )
        .route("/api/users/stats", get(users::user_stats))
        .route(
            "/api/users/{id}",
            put(users::update_user).delete(users::delete_user),
        );

    let admin_routes = if config.disable_rate_limiting {
        tracing::warn!("Rate limiting DISABLED");
        admin_routes_base
    } else {
        tracing::info!(
            per_second = config.rate_limit_per_second,
            burst = config.rate_limit_burst,
            "Rate limiting configured"
        );
        let limiter = GovernorConfigBuilder::default()
            .key_extractor(ClientIpKeyExtractor)
            .per_second(config.rate_limit_per_second.max(1))
            .burst_size(config.rate_limit_burst.max(1))
            .finish()
            .expect("rate limiter settings are clamped to non-zero values");

        admin_routes_base.layer(GovernorLayer {
            config: Arc::new(limiter),
        })
    }
    .layer(RequestBodyLimitLayer::new(64 * 1024));

    // Health check routes (NO rate limiting)
    let health_routes = Router::new().route("/healthz", get(health::healthz));

    // OpenAPI documentation
    let docs_routes = Router::new().merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .merge(health_routes)
        .merge(docs_routes)
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
