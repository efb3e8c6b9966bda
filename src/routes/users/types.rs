use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::users::{Refreshed, User, UserStats};

#[derive(Debug, Serialize, ToSchema)]
pub struct UsersResponse {
    pub users: Vec<User>,
    pub stats: UserStats,
    /// Present when a write succeeded but the list could not be reloaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl UsersResponse {
    #[must_use]
    pub fn new(users: Vec<User>) -> Self {
        let stats = UserStats::from_users(&users);
        Self {
            users,
            stats,
            warning: None,
        }
    }

    #[must_use]
    pub fn after_write(refreshed: Refreshed) -> Self {
        Self {
            warning: refreshed.reload_error,
            ..Self::new(refreshed.users)
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DeleteQuery {
    /// Must be true for the deletion to be sent to the backend
    #[serde(default)]
    pub confirm: bool,
}
