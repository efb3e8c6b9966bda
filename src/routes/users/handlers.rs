use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::common::AppState;
use crate::error::{AppError, AppResult};
use crate::users::{DeleteOutcome, UserForm, UserStats};

use super::types::{DeleteQuery, UsersResponse};

/// List users
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Users retrieved from the backend", body = UsersResponse),
        (status = 502, description = "Backend unavailable"),
    ),
    tag = "users"
)]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<UsersResponse>> {
    let users = state.users.reload().await?;
    Ok(Json(UsersResponse::new(users)))
}

/// Create a user
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = UserForm,
    responses(
        (status = 201, description = "User created, refreshed list returned", body = UsersResponse),
        (status = 422, description = "A required field is missing"),
        (status = 502, description = "Backend rejected the user"),
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(form): Json<UserForm>,
) -> AppResult<(StatusCode, Json<UsersResponse>)> {
    let refreshed = state.users.create(&form).await?;
    Ok((StatusCode::CREATED, Json(UsersResponse::after_write(refreshed))))
}

/// Update a user
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(
        ("id" = String, Path, description = "Backend user id"),
    ),
    request_body = UserForm,
    responses(
        (status = 200, description = "User updated, refreshed list returned", body = UsersResponse),
        (status = 404, description = "Unknown user id"),
        (status = 422, description = "A required field is missing"),
        (status = 502, description = "Backend rejected the update"),
    ),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<UserForm>,
) -> AppResult<Json<UsersResponse>> {
    let refreshed = state.users.update(&id, &form).await?;
    Ok(Json(UsersResponse::after_write(refreshed)))
}

/// Delete a user
///
/// Without `confirm=true` nothing is sent to the backend.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(
        ("id" = String, Path, description = "Backend user id"),
        DeleteQuery,
    ),
    responses(
        (status = 200, description = "User deleted, refreshed list returned", body = UsersResponse),
        (status = 400, description = "Deletion not confirmed"),
        (status = 502, description = "Backend rejected the deletion"),
    ),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> AppResult<Json<UsersResponse>> {
    match state.users.delete(&id, query.confirm).await? {
        (DeleteOutcome::Deleted, refreshed) => Ok(Json(UsersResponse::after_write(refreshed))),
        (DeleteOutcome::Cancelled, _) => Err(AppError::BadRequest(
            "Deletion requires confirmation (confirm=true)".to_string(),
        )),
    }
}

/// Role statistics of the cached user list
#[utoipa::path(
    get,
    path = "/api/users/stats",
    responses(
        (status = 200, description = "Statistics of the last fetched list", body = UserStats),
    ),
    tag = "users"
)]
pub async fn user_stats(State(state): State<AppState>) -> Json<UserStats> {
    Json(UserStats::from_users(&state.users.cached().await))
}
