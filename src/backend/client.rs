use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::backend::models::{ErrorBody, HistoryResponse, LatestResponse, UsersResponse};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::sensors::{Metric, SensorReading, SeriesPoint};
use crate::users::{User, UserForm};

pub struct BackendClient {
    http_client: Client,
    base_url: Url,
}

impl BackendClient {
    /// Build a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Internal` if the base URL is not a usable HTTP base
    /// or the HTTP client cannot be built.
    pub fn new(config: &Config) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.backend_timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {e}")))?;

        let base_url = Url::parse(&config.backend_base_url).map_err(|e| {
            AppError::Internal(format!(
                "Invalid backend URL '{}': {e}",
                config.backend_base_url
            ))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Internal(format!(
                "Backend URL '{base_url}' cannot be used as a base"
            )));
        }

        Ok(Self {
            http_client,
            base_url,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Latest readings of every device.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Backend` if the request fails, returns an error
    /// status, or carries no usable reading.
    pub async fn get_latest(&self) -> AppResult<Vec<SensorReading>> {
        let url = self.endpoint(&["sensors", "latest"]);
        let body: LatestResponse = self.send_json(self.http_client.get(url)).await?;

        let readings = body.into_readings(Utc::now());
        if readings.is_empty() {
            return Err(AppError::Backend(
                "Latest readings response contained no sensor values".to_string(),
            ));
        }
        Ok(readings)
    }

    /// Recent samples of one metric, oldest first when timestamped.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Backend` if the request fails or returns an error status.
    pub async fn get_history(&self, metric: Metric, limit: usize) -> AppResult<Vec<SeriesPoint>> {
        let url = self.endpoint(&["sensors", "history"]);
        let request = self
            .http_client
            .get(url)
            .query(&[("type", metric.as_str().to_string()), ("limit", limit.to_string())]);

        let body: HistoryResponse = self.send_json(request).await?;
        Ok(body.into_points(metric))
    }

    /// # Errors
    ///
    /// Returns `AppError::Backend` if the request fails or returns an error status.
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        let url = self.endpoint(&["users"]);
        let body: UsersResponse = self.send_json(self.http_client.get(url)).await?;
        Ok(body.into_users())
    }

    /// # Errors
    ///
    /// Returns `AppError::Backend` carrying the backend's message when it rejects the user.
    pub async fn create_user(&self, form: &UserForm) -> AppResult<()> {
        let url = self.endpoint(&["users"]);
        self.send(self.http_client.post(url).json(form)).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown id, or `AppError::Backend`
    /// carrying the backend's message when it rejects the update.
    pub async fn update_user(&self, id: &str, form: &UserForm) -> AppResult<()> {
        let url = self.endpoint(&["users", id]);
        self.send(self.http_client.put(url).json(form)).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown id, or `AppError::Backend`
    /// carrying the backend's message when the delete fails.
    pub async fn delete_user(&self, id: &str) -> AppResult<()> {
        let url = self.endpoint(&["users", id]);
        self.send(self.http_client.delete(url)).await?;
        Ok(())
    }

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, request: RequestBuilder) -> AppResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| {
                let preview: String = text.chars().take(200).collect();
                if preview.trim().is_empty() {
                    format!("HTTP {status}")
                } else {
                    format!("HTTP {status}: {preview}")
                }
            });
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(message));
        }
        Err(AppError::Backend(message))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> AppResult<T> {
        // A missing collection means a misconfigured backend, not a missing record
        let response = self.send(request).await.map_err(|e| match e {
            AppError::NotFound(msg) => AppError::Backend(msg),
            other => other,
        })?;
        let text = response
            .text()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to get response text: {e}")))?;

        serde_json::from_str(&text).map_err(|e| {
            tracing::warn!(
                error = %e,
                body_preview = %text.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            AppError::Backend(format!("Failed to parse response: {e}"))
        })
    }
}
