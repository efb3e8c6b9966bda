//! HTML user administration. Mutations answer with the refreshed page and a
//! notice instead of redirecting, so backend messages reach the screen as-is.

use axum::{
    Form,
    extract::{Path, Query, State},
    http::{HeaderMap, header},
    response::{Html, IntoResponse, Redirect},
};
use serde::Deserialize;

use crate::common::AppState;
use crate::error::AppResult;
use crate::render::layout::USER_COOKIE;
use crate::render::users::{Notice, NoticeKind, UsersView, users_page};
use crate::routes::page_context;
use crate::users::{DeleteOutcome, Refreshed, User, UserForm};

#[derive(Debug, Default, Deserialize)]
pub struct UsersPageQuery {
    /// Id of the user whose edit form is shown
    pub edit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    pub confirm: Option<String>,
}

impl DeleteForm {
    fn confirmed(&self) -> bool {
        matches!(self.confirm.as_deref(), Some("true" | "on" | "1"))
    }
}

/// User administration page
pub async fn users_page_handler(
    State(state): State<AppState>,
    Query(query): Query<UsersPageQuery>,
    headers: HeaderMap,
) -> Html<String> {
    let (users, load_error) = load_users(&state).await;
    let editing = query
        .edit
        .as_deref()
        .and_then(|id| users.iter().find(|u| u.id == id));

    let view = UsersView {
        notice: None,
        editing,
        load_error: load_error.as_deref(),
    };
    Html(users_page(&users, &view, &page_context(&headers, None)))
}

pub async fn create_user_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<UserForm>,
) -> Html<String> {
    let result = state.users.create(&form).await;
    respond(&state, &headers, result.map(|r| ("User created.", r))).await
}

pub async fn update_user_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Form(form): Form<UserForm>,
) -> Html<String> {
    let result = state.users.update(&id, &form).await;
    respond(&state, &headers, result.map(|r| ("User updated.", r))).await
}

pub async fn delete_user_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Form(form): Form<DeleteForm>,
) -> Html<String> {
    let result = state
        .users
        .delete(&id, form.confirmed())
        .await
        .map(|(outcome, refreshed)| match outcome {
            DeleteOutcome::Deleted => ("User deleted.", refreshed),
            DeleteOutcome::Cancelled => (
                "Deletion cancelled: tick Confirm to delete a user.",
                refreshed,
            ),
        });
    respond(&state, &headers, result).await
}

/// Clear the logged-in marker and go back to the dashboard.
pub async fn logout() -> impl IntoResponse {
    (
        [(
            header::SET_COOKIE,
            format!("{USER_COOKIE}=; Path=/; Max-Age=0; SameSite=Lax"),
        )],
        Redirect::to("/"),
    )
}

async fn load_users(state: &AppState) -> (Vec<User>, Option<String>) {
    match state.users.reload().await {
        Ok(users) => (users, None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load users");
            (state.users.cached().await, Some(e.user_message()))
        }
    }
}

async fn respond(
    state: &AppState,
    headers: &HeaderMap,
    result: AppResult<(&'static str, Refreshed)>,
) -> Html<String> {
    let (notice, users, reload_error) = match result {
        Ok((message, refreshed)) => (
            Notice {
                kind: NoticeKind::Success,
                message: message.to_string(),
            },
            refreshed.users,
            refreshed.reload_error,
        ),
        Err(e) => {
            tracing::warn!(error = %e, "User operation failed");
            let notice = Notice {
                kind: NoticeKind::Error,
                message: e.user_message(),
            };
            (notice, state.users.cached().await, None)
        }
    };

    let view = UsersView {
        notice: Some(&notice),
        editing: None,
        load_error: reload_error.as_deref(),
    };
    Html(users_page(&users, &view, &page_context(headers, None)))
}
