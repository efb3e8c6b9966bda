use std::sync::Arc;
use tokio::sync::RwLock;

use crate::backend::BackendClient;
use crate::error::AppResult;
use crate::users::models::{FormMode, User, UserForm};

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// Confirmation was not given; nothing was sent to the backend.
    Cancelled,
}

/// User list after a write the backend accepted.
#[derive(Debug, Clone)]
pub struct Refreshed {
    pub users: Vec<User>,
    /// Set when the write went through but the list could not be reloaded;
    /// `users` is then the list held before the write.
    pub reload_error: Option<String>,
}

/// User administration bound to the backend's `/users` collection.
///
/// Only the most recently fetched list is kept. Every successful mutation is
/// followed by a full reload.
pub struct UserDirectory {
    client: Arc<BackendClient>,
    cached: RwLock<Vec<User>>,
}

impl UserDirectory {
    #[must_use]
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self {
            client,
            cached: RwLock::new(Vec::new()),
        }
    }

    /// Last list fetched from the backend, possibly empty.
    pub async fn cached(&self) -> Vec<User> {
        self.cached.read().await.clone()
    }

    /// Fetch the list from the backend and replace the cached copy.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the cached list is left untouched.
    pub async fn reload(&self) -> AppResult<Vec<User>> {
        let users = self.client.list_users().await?;
        tracing::debug!(count = users.len(), "User list reloaded");
        *self.cached.write().await = users.clone();
        Ok(users)
    }

    /// # Errors
    ///
    /// Returns `AppError::Validation` for missing fields (no request is sent),
    /// or the backend error with its message.
    pub async fn create(&self, form: &UserForm) -> AppResult<Refreshed> {
        let form = form.validated(FormMode::Create)?;
        self.client.create_user(&form).await?;
        tracing::info!(email = %form.email, role = form.role.as_str(), "User created");
        Ok(self.refresh_after_write().await)
    }

    /// # Errors
    ///
    /// Returns `AppError::Validation` for missing fields (no request is sent),
    /// or the backend error with its message.
    pub async fn update(&self, id: &str, form: &UserForm) -> AppResult<Refreshed> {
        let form = form.validated(FormMode::Update)?;
        self.client.update_user(id, &form).await?;
        tracing::info!(user_id = %id, "User updated");
        Ok(self.refresh_after_write().await)
    }

    /// Delete a user once the caller has confirmed.
    ///
    /// # Errors
    ///
    /// Returns the backend error with its message.
    pub async fn delete(&self, id: &str, confirmed: bool) -> AppResult<(DeleteOutcome, Refreshed)> {
        if !confirmed {
            tracing::debug!(user_id = %id, "Delete not confirmed, skipping");
            let users = self.cached().await;
            return Ok((
                DeleteOutcome::Cancelled,
                Refreshed {
                    users,
                    reload_error: None,
                },
            ));
        }

        self.client.delete_user(id).await?;
        tracing::info!(user_id = %id, "User deleted");
        Ok((DeleteOutcome::Deleted, self.refresh_after_write().await))
    }

    /// Reload after a successful write. A failed reload does not undo the
    /// write, so it is reported next to the previous list.
    async fn refresh_after_write(&self) -> Refreshed {
        match self.reload().await {
            Ok(users) => Refreshed {
                users,
                reload_error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Write succeeded but user list reload failed");
                Refreshed {
                    users: self.cached().await,
                    reload_error: Some(e.user_message()),
                }
            }
        }
    }
}
