use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::backend::models::{WireId, WireTimestamp};
use crate::error::{AppError, AppResult};

/// Account role. Unknown roles coming from the backend read as `User`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Role {
    Admin,
    Technician,
    #[default]
    User,
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "admin" => Self::Admin,
            "technician" => Self::Technician,
            _ => Self::User,
        }
    }
}

impl Role {
    pub const ALL: [Self; 3] = [Self::User, Self::Technician, Self::Admin];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Technician => "technician",
            Self::User => "user",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::Technician => "Technician",
            Self::User => "User",
        }
    }
}

/// Account as listed by the backend. The password hash never leaves the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", try_from = "WireUser")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: Option<DateTime<Utc>>,
}

/// User as sent by the backend: Mongo `_id`, a virtual `id`, or both;
/// `createdAt` as RFC 3339 text or epoch number.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireUser {
    #[serde(default, rename = "_id")]
    mongo_id: Option<WireId>,
    #[serde(default)]
    id: Option<WireId>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<Role>,
    #[serde(default)]
    created_at: Option<WireTimestamp>,
}

impl TryFrom<WireUser> for User {
    type Error = String;

    fn try_from(wire: WireUser) -> Result<Self, Self::Error> {
        let id = wire
            .mongo_id
            .or(wire.id)
            .map(WireId::into_string)
            .ok_or_else(|| "user without _id or id".to_string())?;

        Ok(Self {
            id,
            name: wire.name.unwrap_or_default(),
            email: wire.email.unwrap_or_default(),
            role: wire.role.unwrap_or_default(),
            created_at: wire.created_at.as_ref().and_then(WireTimestamp::to_datetime),
        })
    }
}

/// Whether a form creates a new account or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Update,
}

/// Body sent to the backend on create and update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl UserForm {
    /// Check required fields and return the trimmed form to send.
    ///
    /// Only presence is checked, never format. On update an empty password
    /// means "keep the current one" and is dropped from the payload.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` naming the first missing field.
    pub fn validated(&self, mode: FormMode) -> AppResult<Self> {
        let name = self.name.trim().to_string();
        let email = self.email.trim().to_string();
        let password = self.password.clone().filter(|p| !p.is_empty());

        if name.is_empty() {
            return Err(AppError::Validation("Missing required field: name".to_string()));
        }
        if email.is_empty() {
            return Err(AppError::Validation("Missing required field: email".to_string()));
        }
        if mode == FormMode::Create && password.is_none() {
            return Err(AppError::Validation(
                "Missing required field: password".to_string(),
            ));
        }

        Ok(Self {
            name,
            email,
            password,
            role: self.role,
        })
    }

    /// Pre-filled edit form. The password is always left blank.
    #[must_use]
    pub fn for_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            password: None,
            role: user.role,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserStats {
    pub total: usize,
    pub admins: usize,
    pub technicians: usize,
}

impl UserStats {
    #[must_use]
    pub fn from_users(users: &[User]) -> Self {
        Self {
            total: users.len(),
            admins: users.iter().filter(|u| u.role == Role::Admin).count(),
            technicians: users.iter().filter(|u| u.role == Role::Technician).count(),
        }
    }
}
