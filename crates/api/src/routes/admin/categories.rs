//! Admin category CRUD.
//!
//! Writes invalidate the cached public category tree.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use sundry_core::CategoryId;

use crate::db::{CategoryRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Category;
use crate::response::{Created, Envelope};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<CategoryId>,
    pub is_active: Option<bool>,
}

/// GET /api/admin/categories
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Envelope<Vec<Category>>> {
    let categories = CategoryRepository::new(state.pool()).list_all().await?;
    Ok(Envelope::new(categories))
}

/// POST /api/admin/categories
#[instrument(skip(state, _admin, body))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(body): Json<CategoryRequest>,
) -> Result<Created<Category>> {
    if body.name.trim().is_empty() || body.slug.trim().is_empty() {
        return Err(AppError::BadRequest("name and slug are required".to_owned()));
    }

    // One level of nesting: a parent must itself be a root
    if let Some(parent_id) = body.parent_id {
        let parent = CategoryRepository::new(state.pool())
            .get_by_id(parent_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("parent category does not exist".to_owned()))?;
        if parent.parent_id.is_some() {
            return Err(AppError::BadRequest(
                "categories nest at most one level".to_owned(),
            ));
        }
    }

    let category = CategoryRepository::new(state.pool())
        .create(
            body.name.trim(),
            body.slug.trim(),
            body.description.as_deref(),
            body.parent_id,
        )
        .await
        .map_err(conflict_to_409)?;

    state.invalidate_catalog_cache().await;
    Ok(Created(category))
}

/// PUT /api/admin/categories/{id}
#[instrument(skip(state, _admin, body))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<CategoryId>,
    Json(body): Json<CategoryRequest>,
) -> Result<Envelope<Category>> {
    if body.parent_id == Some(id) {
        return Err(AppError::BadRequest(
            "a category cannot be its own parent".to_owned(),
        ));
    }

    let category = CategoryRepository::new(state.pool())
        .update(
            id,
            body.name.trim(),
            body.slug.trim(),
            body.description.as_deref(),
            body.parent_id,
            body.is_active.unwrap_or(true),
        )
        .await
        .map_err(conflict_to_409)?
        .ok_or_else(|| AppError::NotFound("category not found".to_owned()))?;

    state.invalidate_catalog_cache().await;
    Ok(Envelope::new(category))
}

/// DELETE /api/admin/categories/{id} (soft delete)
#[instrument(skip(state, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<CategoryId>,
) -> Result<Envelope<Value>> {
    if !CategoryRepository::new(state.pool()).soft_delete(id).await? {
        return Err(AppError::NotFound("category not found".to_owned()));
    }

    state.invalidate_catalog_cache().await;
    Ok(Envelope::new(json!({ "message": "category deleted" })))
}

fn conflict_to_409(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::Conflict(msg) => AppError::Conflict(msg),
        other => other.into(),
    }
}
