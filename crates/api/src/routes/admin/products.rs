//! Admin product CRUD.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use sundry_core::{BrandId, CategoryId, Money, ProductId};

use crate::db::{CategoryRepository, ProductFilter, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Product, ProductSummary};
use crate::response::{Created, Envelope, PageRequest, Pagination};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub stock: i32,
    pub category_id: CategoryId,
    pub brand_id: Option<BrandId>,
    pub image_url: Option<String>,
    /// Ignored on create (new products start active).
    pub is_active: Option<bool>,
}

impl ProductRequest {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest("name is required".to_owned()));
        }
        if !is_valid_slug(&self.slug) {
            return Err(AppError::BadRequest(
                "slug must be lowercase letters, digits, and hyphens".to_owned(),
            ));
        }
        if self.price < Decimal::ZERO {
            return Err(AppError::BadRequest("price must not be negative".to_owned()));
        }
        if self.sale_price.is_some_and(|sale| sale < Decimal::ZERO) {
            return Err(AppError::BadRequest(
                "sale_price must not be negative".to_owned(),
            ));
        }
        if self
            .sale_price
            .is_some_and(|sale| sale >= self.price)
        {
            return Err(AppError::BadRequest(
                "sale_price must be below price".to_owned(),
            ));
        }
        if self.stock < 0 {
            return Err(AppError::BadRequest("stock must not be negative".to_owned()));
        }
        Ok(())
    }
}

/// Slugs are URL path segments: lowercase alphanumerics and hyphens.
fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// GET /api/admin/products
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<ListParams>,
) -> Result<Envelope<Vec<ProductSummary>>> {
    let page = PageRequest::from_params(params.page, params.limit);
    let filter = ProductFilter {
        search: params.q.filter(|q| !q.trim().is_empty()),
        ..ProductFilter::default()
    };

    let (products, total) = ProductRepository::new(state.pool())
        .list(&filter, page.limit, page.offset())
        .await?;

    Ok(Envelope::paginated(
        products,
        Pagination::new(page.page, page.limit, total),
    ))
}

/// POST /api/admin/products
#[instrument(skip(state, _admin, body))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(body): Json<ProductRequest>,
) -> Result<Created<Product>> {
    body.validate()?;

    // Reject dangling category references up front
    CategoryRepository::new(state.pool())
        .get_by_id(body.category_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("category does not exist".to_owned()))?;

    let product = ProductRepository::new(state.pool())
        .create(
            body.name.trim(),
            &body.slug,
            body.description.as_deref().unwrap_or(""),
            Money::new(body.price),
            body.sale_price.map(Money::new),
            body.stock,
            body.category_id,
            body.brand_id,
            body.image_url.as_deref(),
        )
        .await
        .map_err(conflict_to_409)?;

    Ok(Created(product))
}

/// PUT /api/admin/products/{id}
#[instrument(skip(state, _admin, body))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(body): Json<ProductRequest>,
) -> Result<Envelope<Product>> {
    body.validate()?;

    CategoryRepository::new(state.pool())
        .get_by_id(body.category_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("category does not exist".to_owned()))?;

    let product = ProductRepository::new(state.pool())
        .update(
            id,
            body.name.trim(),
            &body.slug,
            body.description.as_deref().unwrap_or(""),
            Money::new(body.price),
            body.sale_price.map(Money::new),
            body.stock,
            body.category_id,
            body.brand_id,
            body.image_url.as_deref(),
            body.is_active.unwrap_or(true),
        )
        .await
        .map_err(conflict_to_409)?
        .ok_or_else(|| AppError::NotFound("product not found".to_owned()))?;

    Ok(Envelope::new(product))
}

/// DELETE /api/admin/products/{id} (soft delete)
#[instrument(skip(state, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Envelope<Value>> {
    if !ProductRepository::new(state.pool()).soft_delete(id).await? {
        return Err(AppError::NotFound("product not found".to_owned()));
    }

    Ok(Envelope::new(json!({ "message": "product deleted" })))
}

fn conflict_to_409(err: crate::db::RepositoryError) -> AppError {
    match err {
        crate::db::RepositoryError::Conflict(msg) => AppError::Conflict(msg),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_validation() {
        assert!(is_valid_slug("walnut-desk"));
        assert!(is_valid_slug("a1"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Walnut"));
        assert!(!is_valid_slug("walnut desk"));
        assert!(!is_valid_slug("-walnut"));
        assert!(!is_valid_slug("walnut-"));
    }
}
