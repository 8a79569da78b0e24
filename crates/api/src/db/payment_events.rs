//! Processed webhook event ids.
//!
//! The payment processor redelivers events until acknowledged, and may
//! deliver the same event more than once. Recording each event id makes the
//! webhook handler idempotent: the first insert wins, duplicates are
//! acknowledged without re-applying their effect.

use sqlx::PgPool;

use sundry_core::OrderId;

use super::RepositoryError;

/// Repository for webhook idempotency records.
pub struct PaymentEventRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PaymentEventRepository<'a> {
    /// Create a new payment event repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record an event id. Returns `true` if this is the first delivery,
    /// `false` if the event was already processed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn record_if_new(
        &self,
        event_id: &str,
        order_id: OrderId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO payment_events (event_id, order_id) VALUES ($1, $2)
             ON CONFLICT (event_id) DO NOTHING",
        )
        .bind(event_id)
        .bind(order_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
