//! Product repository: public catalog queries and admin CRUD.
//!
//! Listing filters are assembled with `sqlx::QueryBuilder` so every value
//! is a bound parameter, never interpolated.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use sundry_core::{BrandId, CategoryId, Money, ProductId};

use super::RepositoryError;
use crate::models::{Product, ProductSummary};

const PRODUCT_COLUMNS: &str = "id, name, slug, description, price, sale_price, stock, \
     category_id, brand_id, image_url, is_active, created_at, updated_at";

/// Sort orders for the public product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Name,
}

impl ProductSort {
    /// Parse the `sort` query parameter, defaulting to newest-first.
    #[must_use]
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("price_asc") => Self::PriceAsc,
            Some("price_desc") => Self::PriceDesc,
            Some("name") => Self::Name,
            _ => Self::Newest,
        }
    }

    /// ORDER BY clause. Price sorts use the effective (sale) price.
    const fn order_by(self) -> &'static str {
        match self {
            Self::Newest => "p.created_at DESC",
            Self::PriceAsc => "COALESCE(p.sale_price, p.price) ASC",
            Self::PriceDesc => "COALESCE(p.sale_price, p.price) DESC",
            Self::Name => "p.name ASC",
        }
    }
}

/// Filters for the public product listing.
#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    /// Case-insensitive substring match on name or description.
    pub search: Option<String>,
    pub category_slug: Option<String>,
    pub brand_slug: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: ProductSort,
}

impl ProductFilter {
    /// Append the shared WHERE clauses for this filter.
    fn push_conditions(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        builder.push(" WHERE p.is_active AND p.deleted_at IS NULL");

        if let Some(search) = &self.search {
            let pattern = format!("%{}%", search.trim());
            builder
                .push(" AND (p.name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR p.description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(category) = &self.category_slug {
            builder
                .push(" AND c.slug = ")
                .push_bind(category.clone());
        }
        if let Some(brand) = &self.brand_slug {
            builder.push(" AND b.slug = ").push_bind(brand.clone());
        }
        if let Some(min) = self.min_price {
            builder
                .push(" AND COALESCE(p.sale_price, p.price) >= ")
                .push_bind(min);
        }
        if let Some(max) = self.max_price {
            builder
                .push(" AND COALESCE(p.sale_price, p.price) <= ")
                .push_bind(max);
        }
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Public listing: filtered, sorted, paginated summaries with joined
    /// names and review aggregates.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ProductSummary>, i64), RepositoryError> {
        let mut builder = QueryBuilder::new(
            "SELECT p.id, p.name, p.slug, p.price, p.sale_price, p.stock, p.image_url, \
             c.name AS category_name, b.name AS brand_name, \
             AVG(r.rating)::numeric(3,2) AS avg_rating, COUNT(r.id) AS review_count \
             FROM products p \
             JOIN categories c ON c.id = p.category_id \
             LEFT JOIN brands b ON b.id = p.brand_id \
             LEFT JOIN reviews r ON r.product_id = p.id",
        );
        filter.push_conditions(&mut builder);
        builder
            .push(" GROUP BY p.id, c.name, b.name ORDER BY ")
            .push(filter.sort.order_by())
            .push(" LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let products = builder
            .build_query_as::<ProductSummary>()
            .fetch_all(self.pool)
            .await?;

        let mut count_builder = QueryBuilder::new(
            "SELECT COUNT(*) FROM products p \
             JOIN categories c ON c.id = p.category_id \
             LEFT JOIN brands b ON b.id = p.brand_id",
        );
        filter.push_conditions(&mut count_builder);

        let (total,): (i64,) = count_builder
            .build_query_as()
            .fetch_one(self.pool)
            .await?;

        Ok((products, total))
    }

    /// Get an active product by slug (public detail page).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE slug = $1 AND is_active AND deleted_at IS NULL"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Get any non-deleted product by id (admin surface).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        name: &str,
        slug: &str,
        description: &str,
        price: Money,
        sale_price: Option<Money>,
        stock: i32,
        category_id: CategoryId,
        brand_id: Option<BrandId>,
        image_url: Option<&str>,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products
                 (name, slug, description, price, sale_price, stock, category_id, brand_id, image_url)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(name)
        .bind(slug)
        .bind(description)
        .bind(price)
        .bind(sale_price)
        .bind(stock)
        .bind(category_id)
        .bind(brand_id)
        .bind(image_url)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, "product slug already exists"))
    }

    /// Update a product in place.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new slug is taken.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: ProductId,
        name: &str,
        slug: &str,
        description: &str,
        price: Money,
        sale_price: Option<Money>,
        stock: i32,
        category_id: CategoryId,
        brand_id: Option<BrandId>,
        image_url: Option<&str>,
        is_active: bool,
    ) -> Result<Option<Product>, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET
                 name = $2, slug = $3, description = $4, price = $5, sale_price = $6,
                 stock = $7, category_id = $8, brand_id = $9, image_url = $10,
                 is_active = $11, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .bind(slug)
        .bind(description)
        .bind(price)
        .bind(sale_price)
        .bind(stock)
        .bind(category_id)
        .bind(brand_id)
        .bind(image_url)
        .bind(is_active)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, "product slug already exists"))
    }

    /// Soft-delete a product. Returns `false` when it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn soft_delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE products SET deleted_at = NOW(), is_active = FALSE
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
