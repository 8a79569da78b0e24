//! Token repository: OTP verification codes and opaque bearer tokens.
//!
//! Bearer tokens are stored as SHA-256 hashes; the raw value exists only in
//! the response that issued it.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use sundry_core::{TokenPurpose, UserId};

use super::RepositoryError;
use crate::models::AuthTokenKind;

/// Repository for verification codes and bearer tokens.
pub struct TokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TokenRepository<'a> {
    /// Create a new token repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Verification codes (OTP)
    // =========================================================================

    /// Store a fresh OTP code, invalidating previous codes for the same
    /// purpose.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_verification_code(
        &self,
        user_id: UserId,
        code: &str,
        purpose: TokenPurpose,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE verification_tokens SET consumed_at = NOW()
             WHERE user_id = $1 AND purpose = $2 AND consumed_at IS NULL",
        )
        .bind(user_id)
        .bind(purpose)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO verification_tokens (user_id, code, purpose, expires_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(user_id)
        .bind(code)
        .bind(purpose)
        .bind(expires_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Consume a valid OTP code. Returns `false` when the code is wrong,
    /// expired, or already consumed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn consume_verification_code(
        &self,
        user_id: UserId,
        code: &str,
        purpose: TokenPurpose,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE verification_tokens SET consumed_at = NOW()
             WHERE user_id = $1 AND code = $2 AND purpose = $3
               AND consumed_at IS NULL AND expires_at > NOW()",
        )
        .bind(user_id)
        .bind(code)
        .bind(purpose)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Bearer tokens
    // =========================================================================

    /// Store a hashed bearer token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_auth_token(
        &self,
        user_id: UserId,
        token_hash: &str,
        kind: AuthTokenKind,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO auth_tokens (user_id, token_hash, kind, expires_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(kind)
        .bind(expires_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Look up the owner of a live (unexpired, unrevoked) token by hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_live_token_user(
        &self,
        token_hash: &str,
        kind: AuthTokenKind,
    ) -> Result<Option<UserId>, RepositoryError> {
        let row: Option<(UserId,)> = sqlx::query_as(
            "SELECT user_id FROM auth_tokens
             WHERE token_hash = $1 AND kind = $2
               AND revoked_at IS NULL AND expires_at > NOW()",
        )
        .bind(token_hash)
        .bind(kind)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(user_id,)| user_id))
    }

    /// Revoke a token by hash. Returns `false` when no live token matched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn revoke_token(&self, token_hash: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE auth_tokens SET revoked_at = NOW()
             WHERE token_hash = $1 AND revoked_at IS NULL",
        )
        .bind(token_hash)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Revoke every token a user holds (password reset).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn revoke_all_for_user(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE auth_tokens SET revoked_at = NOW()
             WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
