//! Public category route handlers.

use std::sync::Arc;

use axum::extract::State;
use tracing::instrument;

use crate::db::CategoryRepository;
use crate::error::Result;
use crate::models::{CategoryNode, build_category_tree};
use crate::response::Envelope;
use crate::state::AppState;

/// GET /api/categories
///
/// The tree is cached; admin writes invalidate it.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Envelope<Vec<CategoryNode>>> {
    if let Some(tree) = state.category_cache().get(&0).await {
        return Ok(Envelope::new(tree.as_ref().clone()));
    }

    let categories = CategoryRepository::new(state.pool()).list_active().await?;
    let tree = Arc::new(build_category_tree(categories));
    state.category_cache().insert(0, Arc::clone(&tree)).await;

    Ok(Envelope::new(tree.as_ref().clone()))
}
