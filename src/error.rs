use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Message meant for the person at the screen, without the variant prefix.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend(msg)
            | Self::BadRequest(msg)
            | Self::Validation(msg)
            | Self::NotFound(msg) => msg.clone(),
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Config(_) => "Configuration error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Backend(msg) => {
                tracing::error!("Backend error: {msg}");
                StatusCode::BAD_GATEWAY
            }
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Config(e) => {
                tracing::error!("Config error: {e:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        };

        let body = Json(json!({
            "error": self.user_message(),
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
