//! Authentication service.
//!
//! Password auth with argon2 hashing, email-verification OTP codes, and
//! opaque bearer tokens (access + refresh) stored SHA-256-hashed. Raw token
//! values exist only in the issuing response.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use sundry_core::{Email, TokenPurpose, UserId, UserRole};

use crate::db::{TokenRepository, UserRepository};
use crate::models::{AuthTokenKind, CurrentUser, User};
use crate::services::email::EmailService;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Access tokens live for one hour.
const ACCESS_TOKEN_TTL_SECS: i64 = 3600;

/// Refresh tokens live for thirty days.
const REFRESH_TOKEN_TTL_SECS: i64 = 30 * 24 * 3600;

/// OTP codes live for fifteen minutes.
const OTP_TTL_SECS: i64 = 15 * 60;

/// Access and refresh token pair returned on login/refresh.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: TokenRepository<'a>,
    email: &'a EmailService,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, email: &'a EmailService) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens: TokenRepository::new(pool),
            email,
        }
    }

    // =========================================================================
    // Registration & login
    // =========================================================================

    /// Register a new customer and send a verification code.
    ///
    /// The email send is best-effort: a delivery failure is logged, never
    /// surfaced to the caller.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::EmailTaken` if the email is already registered.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&email, &password_hash, full_name.trim(), UserRole::Customer)
            .await
            .map_err(|e| match e {
                crate::db::RepositoryError::Conflict(_) => AuthError::EmailTaken,
                other => AuthError::Repository(other),
            })?;

        self.issue_otp(&user, TokenPurpose::EmailVerify).await?;

        Ok(user)
    }

    /// Login with email and password, issuing a token pair.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, TokenPair), AuthError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let pair = self.issue_token_pair(user.id).await?;
        Ok((user, pair))
    }

    /// Verify an email OTP code and mark the account verified.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCode` when the code is wrong, expired, or
    /// already consumed.
    pub async fn verify_email_otp(&self, email: &str, code: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;
        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCode)?;

        let consumed = self
            .tokens
            .consume_verification_code(user.id, code.trim(), TokenPurpose::EmailVerify)
            .await?;
        if !consumed {
            return Err(AuthError::InvalidCode);
        }

        self.users.mark_email_verified(user.id).await?;
        Ok(())
    }

    // =========================================================================
    // Token lifecycle
    // =========================================================================

    /// Exchange a refresh token for a new pair, revoking the old one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` when the token is unknown, revoked,
    /// or expired.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let hash = hash_token(refresh_token);

        let user_id = self
            .tokens
            .get_live_token_user(&hash, AuthTokenKind::Refresh)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        // Rotation: the presented token is single-use
        self.tokens.revoke_token(&hash).await?;

        self.issue_token_pair(user_id).await
    }

    /// Revoke a refresh token (logout).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the database operation fails.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        self.tokens.revoke_token(&hash_token(refresh_token)).await?;
        Ok(())
    }

    /// Resolve a bearer access token to the calling user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` when the token is unknown, revoked,
    /// or expired.
    pub async fn authenticate(&self, access_token: &str) -> Result<CurrentUser, AuthError> {
        let user_id = self
            .tokens
            .get_live_token_user(&hash_token(access_token), AuthTokenKind::Access)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        Ok(CurrentUser::from(&user))
    }

    // =========================================================================
    // Password reset
    // =========================================================================

    /// Issue a password-reset code.
    ///
    /// Deliberately succeeds for unknown emails so the endpoint does not
    /// leak which addresses have accounts.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the database operation fails.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let Ok(email) = Email::parse(email) else {
            return Ok(());
        };
        let Some(user) = self.users.get_by_email(&email).await? else {
            return Ok(());
        };

        self.issue_otp(&user, TokenPurpose::PasswordReset).await?;
        Ok(())
    }

    /// Complete a password reset with the emailed code.
    ///
    /// Every outstanding session token is revoked afterwards.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCode` when the code is wrong, expired, or
    /// already consumed.
    pub async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let email = Email::parse(email)?;
        validate_password(new_password)?;

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCode)?;

        let consumed = self
            .tokens
            .consume_verification_code(user.id, code.trim(), TokenPurpose::PasswordReset)
            .await?;
        if !consumed {
            return Err(AuthError::InvalidCode);
        }

        let password_hash = hash_password(new_password)?;
        self.users
            .update_password_hash(user.id, &password_hash)
            .await?;
        self.tokens.revoke_all_for_user(user.id).await?;

        Ok(())
    }

    /// Change the password of a logged-in user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the current password is
    /// wrong.
    pub async fn change_password(
        &self,
        user_id: UserId,
        email: &Email,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        validate_password(new_password)?;

        let (_, password_hash) = self
            .users
            .get_password_hash(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        verify_password(current_password, &password_hash)?;

        let new_hash = hash_password(new_password)?;
        self.users.update_password_hash(user_id, &new_hash).await?;

        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Generate, store, and email a six-digit code. Delivery failures are
    /// logged and swallowed.
    async fn issue_otp(&self, user: &User, purpose: TokenPurpose) -> Result<(), AuthError> {
        let code = generate_otp_code();
        let expires_at = Utc::now() + Duration::seconds(OTP_TTL_SECS);

        self.tokens
            .create_verification_code(user.id, &code, purpose, expires_at)
            .await?;

        if let Err(e) = self.email.send_otp_code(&user.email, &code, purpose).await {
            tracing::warn!(user_id = %user.id, error = %e, "Failed to send OTP email");
        }

        Ok(())
    }

    async fn issue_token_pair(&self, user_id: UserId) -> Result<TokenPair, AuthError> {
        let access_token = generate_token();
        let refresh_token = generate_token();
        let now = Utc::now();

        self.tokens
            .create_auth_token(
                user_id,
                &hash_token(&access_token),
                AuthTokenKind::Access,
                now + Duration::seconds(ACCESS_TOKEN_TTL_SECS),
            )
            .await?;
        self.tokens
            .create_auth_token(
                user_id,
                &hash_token(&refresh_token),
                AuthTokenKind::Refresh,
                now + Duration::seconds(REFRESH_TOKEN_TTL_SECS),
            )
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: ACCESS_TOKEN_TTL_SECS,
        })
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password with argon2 and a fresh salt.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Verify a password against a stored argon2 hash.
fn verify_password(password: &str, stored_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| AuthError::PasswordHash(e.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Generate an opaque bearer token: 32 random bytes, base64url.
fn generate_token() -> String {
    use rand::RngCore;

    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// SHA-256 hex digest of a token, as stored in `auth_tokens`.
fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Generate a 6-digit verification code.
#[must_use]
pub fn generate_otp_code() -> String {
    use rand::Rng;
    let code: u32 = rand::rng().random_range(100_000..1_000_000);
    code.to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_code_is_six_digits() {
        for _ in 0..50 {
            let code = generate_otp_code();
            assert_eq!(code.len(), 6);
            assert!(code.bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn test_generate_token_unique_and_urlsafe() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        // 32 bytes => 43 base64url chars, no padding
        assert_eq!(a.len(), 43);
        assert!(!a.contains('=') && !a.contains('+') && !a.contains('/'));
    }

    #[test]
    fn test_hash_token_is_stable() {
        assert_eq!(hash_token("abc"), hash_token("abc"));
        assert_ne!(hash_token("abc"), hash_token("abd"));
        assert_eq!(hash_token("abc").len(), 64);
    }

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
    }
}
