//! Public product route handlers.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::{
    BrandRepository, CategoryRepository, ProductFilter, ProductRepository, ProductSort,
    ReviewRepository,
};
use crate::error::{AppError, Result};
use crate::models::{Brand, Category, Product};
use crate::response::{Envelope, PageRequest, Pagination};
use crate::state::AppState;

/// Query parameters for the product listing.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Substring search over name and description.
    pub q: Option<String>,
    /// Category slug filter.
    pub category: Option<String>,
    /// Brand slug filter.
    pub brand: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// One of `newest`, `price_asc`, `price_desc`, `name`.
    pub sort: Option<String>,
}

/// Product detail payload: the product plus its category, brand, and
/// review aggregate.
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    /// Sale price when set, list price otherwise.
    pub effective_price: sundry_core::Money,
    pub category: Option<Category>,
    pub brand: Option<Brand>,
    pub avg_rating: Option<Decimal>,
    pub review_count: i64,
}

/// GET /api/products
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse> {
    let page = PageRequest::from_params(params.page, params.limit);

    if let (Some(min), Some(max)) = (params.min_price, params.max_price)
        && min > max
    {
        return Err(AppError::BadRequest(
            "min_price must not exceed max_price".to_owned(),
        ));
    }

    let filter = ProductFilter {
        search: params.q.filter(|q| !q.trim().is_empty()),
        category_slug: params.category,
        brand_slug: params.brand,
        min_price: params.min_price,
        max_price: params.max_price,
        sort: ProductSort::from_param(params.sort.as_deref()),
    };

    let (products, total) = ProductRepository::new(state.pool())
        .list(&filter, page.limit, page.offset())
        .await?;

    Ok(Envelope::paginated(
        products,
        Pagination::new(page.page, page.limit, total),
    ))
}

/// GET /api/products/{slug}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Envelope<ProductDetail>> {
    let pool = state.pool();

    let product = ProductRepository::new(pool)
        .get_active_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product '{slug}' not found")))?;

    let category = CategoryRepository::new(pool)
        .get_by_id(product.category_id)
        .await?;

    let brand = match product.brand_id {
        Some(brand_id) => BrandRepository::new(pool).get_by_id(brand_id).await?,
        None => None,
    };

    let (avg_rating, review_count) = ReviewRepository::new(pool)
        .rating_summary(product.id)
        .await?;

    Ok(Envelope::new(ProductDetail {
        effective_price: product.effective_price(),
        product,
        category,
        brand,
        avg_rating,
        review_count,
    }))
}
