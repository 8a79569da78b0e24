//! Brand repository.

use sqlx::PgPool;

use sundry_core::BrandId;

use super::RepositoryError;
use crate::models::Brand;

const BRAND_COLUMNS: &str = "id, name, slug, logo_url, is_active, created_at, updated_at";

/// Repository for brand database operations.
pub struct BrandRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BrandRepository<'a> {
    /// Create a new brand repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All active brands, alphabetical.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self) -> Result<Vec<Brand>, RepositoryError> {
        let brands = sqlx::query_as::<_, Brand>(&format!(
            "SELECT {BRAND_COLUMNS} FROM brands
             WHERE is_active AND deleted_at IS NULL
             ORDER BY name"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(brands)
    }

    /// All non-deleted brands (admin surface).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Brand>, RepositoryError> {
        let brands = sqlx::query_as::<_, Brand>(&format!(
            "SELECT {BRAND_COLUMNS} FROM brands WHERE deleted_at IS NULL ORDER BY name"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(brands)
    }

    /// Get a non-deleted brand by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: BrandId) -> Result<Option<Brand>, RepositoryError> {
        let brand = sqlx::query_as::<_, Brand>(&format!(
            "SELECT {BRAND_COLUMNS} FROM brands WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(brand)
    }

    /// Create a brand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn create(
        &self,
        name: &str,
        slug: &str,
        logo_url: Option<&str>,
    ) -> Result<Brand, RepositoryError> {
        sqlx::query_as::<_, Brand>(&format!(
            "INSERT INTO brands (name, slug, logo_url)
             VALUES ($1, $2, $3)
             RETURNING {BRAND_COLUMNS}"
        ))
        .bind(name)
        .bind(slug)
        .bind(logo_url)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, "brand slug already exists"))
    }

    /// Update a brand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new slug is taken.
    pub async fn update(
        &self,
        id: BrandId,
        name: &str,
        slug: &str,
        logo_url: Option<&str>,
        is_active: bool,
    ) -> Result<Option<Brand>, RepositoryError> {
        sqlx::query_as::<_, Brand>(&format!(
            "UPDATE brands SET
                 name = $2, slug = $3, logo_url = $4, is_active = $5, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {BRAND_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .bind(slug)
        .bind(logo_url)
        .bind(is_active)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, "brand slug already exists"))
    }

    /// Soft-delete a brand. Returns `false` when it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn soft_delete(&self, id: BrandId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE brands SET deleted_at = NOW(), is_active = FALSE
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
