//! Product review route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use crate::db::{ProductRepository, ReviewRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::Review;
use crate::response::{Created, Envelope, PageRequest, Pagination};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub rating: i32,
    pub comment: Option<String>,
}

/// GET /api/products/{slug}/reviews
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Envelope<Vec<Review>>> {
    let page = PageRequest::from_params(params.page, params.limit);

    let product = ProductRepository::new(state.pool())
        .get_active_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product '{slug}' not found")))?;

    let (reviews, total) = ReviewRepository::new(state.pool())
        .list_for_product(product.id, page.limit, page.offset())
        .await?;

    Ok(Envelope::paginated(
        reviews,
        Pagination::new(page.page, page.limit, total),
    ))
}

/// POST /api/products/{slug}/reviews
///
/// One review per user per product, and only for products the caller has
/// actually purchased.
#[instrument(skip(state, user, body))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(slug): Path<String>,
    Json(body): Json<CreateReviewRequest>,
) -> Result<Created<Review>> {
    if !(1..=5).contains(&body.rating) {
        return Err(AppError::BadRequest(
            "rating must be between 1 and 5".to_owned(),
        ));
    }

    let product = ProductRepository::new(state.pool())
        .get_active_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product '{slug}' not found")))?;

    let reviews = ReviewRepository::new(state.pool());

    if !reviews.user_purchased_product(user.id, product.id).await? {
        return Err(AppError::Forbidden(
            "only purchasers can review a product".to_owned(),
        ));
    }

    let review = reviews
        .create(
            product.id,
            user.id,
            body.rating,
            body.comment.as_deref().unwrap_or("").trim(),
        )
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::Conflict(msg) => AppError::Conflict(msg),
            other => other.into(),
        })?;

    Ok(Created(review))
}
