//! Admin brand CRUD.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use sundry_core::BrandId;

use crate::db::{BrandRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Brand;
use crate::response::{Created, Envelope};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BrandRequest {
    pub name: String,
    pub slug: String,
    pub logo_url: Option<String>,
    pub is_active: Option<bool>,
}

/// GET /api/admin/brands
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Envelope<Vec<Brand>>> {
    let brands = BrandRepository::new(state.pool()).list_all().await?;
    Ok(Envelope::new(brands))
}

/// POST /api/admin/brands
#[instrument(skip(state, _admin, body))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(body): Json<BrandRequest>,
) -> Result<Created<Brand>> {
    if body.name.trim().is_empty() || body.slug.trim().is_empty() {
        return Err(AppError::BadRequest("name and slug are required".to_owned()));
    }

    let brand = BrandRepository::new(state.pool())
        .create(body.name.trim(), body.slug.trim(), body.logo_url.as_deref())
        .await
        .map_err(conflict_to_409)?;

    Ok(Created(brand))
}

/// PUT /api/admin/brands/{id}
#[instrument(skip(state, _admin, body))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<BrandId>,
    Json(body): Json<BrandRequest>,
) -> Result<Envelope<Brand>> {
    let brand = BrandRepository::new(state.pool())
        .update(
            id,
            body.name.trim(),
            body.slug.trim(),
            body.logo_url.as_deref(),
            body.is_active.unwrap_or(true),
        )
        .await
        .map_err(conflict_to_409)?
        .ok_or_else(|| AppError::NotFound("brand not found".to_owned()))?;

    Ok(Envelope::new(brand))
}

/// DELETE /api/admin/brands/{id} (soft delete)
#[instrument(skip(state, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<BrandId>,
) -> Result<Envelope<Value>> {
    if !BrandRepository::new(state.pool()).soft_delete(id).await? {
        return Err(AppError::NotFound("brand not found".to_owned()));
    }

    Ok(Envelope::new(json!({ "message": "brand deleted" })))
}

fn conflict_to_409(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::Conflict(msg) => AppError::Conflict(msg),
        other => other.into(),
    }
}
