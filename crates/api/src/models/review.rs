//! Product reviews.

use chrono::{DateTime, Utc};
use serde::Serialize;

use sundry_core::{ProductId, ReviewId, UserId};

/// A product review. One per (product, user).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    /// Reviewer display name, joined from `users`.
    pub author_name: String,
    /// 1 to 5 stars.
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}
