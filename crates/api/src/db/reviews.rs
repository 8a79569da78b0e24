//! Review repository.

use sqlx::PgPool;

use sundry_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::Review;

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Reviews for a product, newest first, with author names.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Review>, i64), RepositoryError> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT r.id, r.product_id, r.user_id, u.full_name AS author_name,
                    r.rating, r.comment, r.created_at
             FROM reviews r
             JOIN users u ON u.id = r.user_id
             WHERE r.product_id = $1
             ORDER BY r.created_at DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(product_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM reviews WHERE product_id = $1")
                .bind(product_id)
                .fetch_one(self.pool)
                .await?;

        Ok((reviews, total))
    }

    /// Average rating and count for a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn rating_summary(
        &self,
        product_id: ProductId,
    ) -> Result<(Option<rust_decimal::Decimal>, i64), RepositoryError> {
        let summary: (Option<rust_decimal::Decimal>, i64) = sqlx::query_as(
            "SELECT AVG(rating)::numeric(3,2), COUNT(*) FROM reviews WHERE product_id = $1",
        )
        .bind(product_id)
        .fetch_one(self.pool)
        .await?;

        Ok(summary)
    }

    /// Whether the user has a non-cancelled order containing the product.
    ///
    /// Reviews are restricted to verified purchasers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn user_purchased_product(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                 SELECT 1 FROM order_items oi
                 JOIN orders o ON o.id = oi.order_id
                 WHERE o.user_id = $1 AND oi.product_id = $2
                   AND o.status <> 'cancelled'
             )",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Create a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already reviewed the
    /// product.
    pub async fn create(
        &self,
        product_id: ProductId,
        user_id: UserId,
        rating: i32,
        comment: &str,
    ) -> Result<Review, RepositoryError> {
        sqlx::query_as::<_, Review>(
            "WITH inserted AS (
                 INSERT INTO reviews (product_id, user_id, rating, comment)
                 VALUES ($1, $2, $3, $4)
                 RETURNING id, product_id, user_id, rating, comment, created_at
             )
             SELECT i.id, i.product_id, i.user_id, u.full_name AS author_name,
                    i.rating, i.comment, i.created_at
             FROM inserted i
             JOIN users u ON u.id = i.user_id",
        )
        .bind(product_id)
        .bind(user_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            RepositoryError::from_unique_violation(e, "you have already reviewed this product")
        })
    }
}
