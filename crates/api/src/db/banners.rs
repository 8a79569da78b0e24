//! Banner repository.

use sqlx::PgPool;

use sundry_core::BannerId;

use super::RepositoryError;
use crate::models::Banner;

const BANNER_COLUMNS: &str =
    "id, title, image_url, link_url, sort_order, is_active, created_at, updated_at";

/// Repository for banner database operations.
pub struct BannerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BannerRepository<'a> {
    /// Create a new banner repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Active banners in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self) -> Result<Vec<Banner>, RepositoryError> {
        let banners = sqlx::query_as::<_, Banner>(&format!(
            "SELECT {BANNER_COLUMNS} FROM banners WHERE is_active ORDER BY sort_order, id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(banners)
    }

    /// All banners (admin surface).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Banner>, RepositoryError> {
        let banners = sqlx::query_as::<_, Banner>(&format!(
            "SELECT {BANNER_COLUMNS} FROM banners ORDER BY sort_order, id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(banners)
    }

    /// Create a banner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        title: &str,
        image_url: &str,
        link_url: Option<&str>,
        sort_order: i32,
    ) -> Result<Banner, RepositoryError> {
        let banner = sqlx::query_as::<_, Banner>(&format!(
            "INSERT INTO banners (title, image_url, link_url, sort_order)
             VALUES ($1, $2, $3, $4)
             RETURNING {BANNER_COLUMNS}"
        ))
        .bind(title)
        .bind(image_url)
        .bind(link_url)
        .bind(sort_order)
        .fetch_one(self.pool)
        .await?;

        Ok(banner)
    }

    /// Update a banner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: BannerId,
        title: &str,
        image_url: &str,
        link_url: Option<&str>,
        sort_order: i32,
        is_active: bool,
    ) -> Result<Option<Banner>, RepositoryError> {
        let banner = sqlx::query_as::<_, Banner>(&format!(
            "UPDATE banners SET
                 title = $2, image_url = $3, link_url = $4, sort_order = $5,
                 is_active = $6, updated_at = NOW()
             WHERE id = $1
             RETURNING {BANNER_COLUMNS}"
        ))
        .bind(id)
        .bind(title)
        .bind(image_url)
        .bind(link_url)
        .bind(sort_order)
        .bind(is_active)
        .fetch_optional(self.pool)
        .await?;

        Ok(banner)
    }

    /// Delete a banner. Returns `false` when it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: BannerId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM banners WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
