//! Admin banner CRUD.
//!
//! Writes invalidate the cached public banner list.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use sundry_core::BannerId;

use crate::db::BannerRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Banner;
use crate::response::{Created, Envelope};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BannerRequest {
    pub title: String,
    pub image_url: String,
    pub link_url: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// GET /api/admin/banners
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Envelope<Vec<Banner>>> {
    let banners = BannerRepository::new(state.pool()).list_all().await?;
    Ok(Envelope::new(banners))
}

/// POST /api/admin/banners
#[instrument(skip(state, _admin, body))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(body): Json<BannerRequest>,
) -> Result<Created<Banner>> {
    if body.title.trim().is_empty() || body.image_url.trim().is_empty() {
        return Err(AppError::BadRequest(
            "title and image_url are required".to_owned(),
        ));
    }

    let banner = BannerRepository::new(state.pool())
        .create(
            body.title.trim(),
            body.image_url.trim(),
            body.link_url.as_deref(),
            body.sort_order.unwrap_or(0),
        )
        .await?;

    state.invalidate_catalog_cache().await;
    Ok(Created(banner))
}

/// PUT /api/admin/banners/{id}
#[instrument(skip(state, _admin, body))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<BannerId>,
    Json(body): Json<BannerRequest>,
) -> Result<Envelope<Banner>> {
    let banner = BannerRepository::new(state.pool())
        .update(
            id,
            body.title.trim(),
            body.image_url.trim(),
            body.link_url.as_deref(),
            body.sort_order.unwrap_or(0),
            body.is_active.unwrap_or(true),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("banner not found".to_owned()))?;

    state.invalidate_catalog_cache().await;
    Ok(Envelope::new(banner))
}

/// DELETE /api/admin/banners/{id}
#[instrument(skip(state, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<BannerId>,
) -> Result<Envelope<Value>> {
    if !BannerRepository::new(state.pool()).delete(id).await? {
        return Err(AppError::NotFound("banner not found".to_owned()));
    }

    state.invalidate_catalog_cache().await;
    Ok(Envelope::new(json!({ "message": "banner deleted" })))
}
