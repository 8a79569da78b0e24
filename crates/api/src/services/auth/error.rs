//! Authentication error types.

use thiserror::Error;

use sundry_core::EmailError;

use crate::db::RepositoryError;

/// Errors from the authentication service.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The email address is malformed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The password does not meet requirements.
    #[error("{0}")]
    WeakPassword(String),

    /// An account with this email already exists.
    #[error("an account with this email already exists")]
    EmailTaken,

    /// Wrong email or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The verification code is wrong, expired, or already used.
    #[error("invalid or expired verification code")]
    InvalidCode,

    /// The bearer token is unknown, revoked, or expired.
    #[error("invalid or expired token")]
    InvalidToken,

    /// Password hashing failed.
    #[error("password hashing error: {0}")]
    PasswordHash(String),

    /// Database operation failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}
