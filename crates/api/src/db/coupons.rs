//! Coupon repository (admin-managed discount codes).

use rust_decimal::Decimal;
use sqlx::PgPool;

use chrono::{DateTime, Utc};
use sundry_core::{CouponId, Money};

use super::RepositoryError;
use crate::models::Coupon;

const COUPON_COLUMNS: &str =
    "id, code, percent_off, amount_off, expires_at, is_active, created_at, updated_at";

/// Repository for coupon database operations.
pub struct CouponRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CouponRepository<'a> {
    /// Create a new coupon repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All coupons, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Coupon>, RepositoryError> {
        let coupons = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(coupons)
    }

    /// Create a coupon. Codes are stored uppercase.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the code is taken.
    pub async fn create(
        &self,
        code: &str,
        percent_off: Option<Decimal>,
        amount_off: Option<Money>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Coupon, RepositoryError> {
        sqlx::query_as::<_, Coupon>(&format!(
            "INSERT INTO coupons (code, percent_off, amount_off, expires_at)
             VALUES (UPPER($1), $2, $3, $4)
             RETURNING {COUPON_COLUMNS}"
        ))
        .bind(code)
        .bind(percent_off)
        .bind(amount_off)
        .bind(expires_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, "coupon code already exists"))
    }

    /// Update a coupon's activation and expiry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: CouponId,
        expires_at: Option<DateTime<Utc>>,
        is_active: bool,
    ) -> Result<Option<Coupon>, RepositoryError> {
        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "UPDATE coupons SET expires_at = $2, is_active = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {COUPON_COLUMNS}"
        ))
        .bind(id)
        .bind(expires_at)
        .bind(is_active)
        .fetch_optional(self.pool)
        .await?;

        Ok(coupon)
    }

    /// Delete a coupon. Returns `false` when it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: CouponId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM coupons WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
