//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sundry_core::{Email, UserId, UserRole};

/// A registered user.
///
/// The password hash never leaves the db layer; this type is safe to
/// serialize into API responses.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Display name.
    pub full_name: String,
    /// Permission level.
    pub role: UserRole,
    /// Whether the email has been verified via OTP.
    pub email_verified: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The authenticated caller, resolved from a bearer token.
///
/// Carried by the auth extractors in [`crate::middleware::auth`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Email,
    pub role: UserRole,
}

impl CurrentUser {
    /// Whether this user may use the admin surface.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Kind of an opaque bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "auth_token_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AuthTokenKind {
    Access,
    Refresh,
}
