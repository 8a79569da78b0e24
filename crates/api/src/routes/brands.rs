//! Public brand route handlers.

use axum::extract::State;
use tracing::instrument;

use crate::db::BrandRepository;
use crate::error::Result;
use crate::models::Brand;
use crate::response::Envelope;
use crate::state::AppState;

/// GET /api/brands
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Envelope<Vec<Brand>>> {
    let brands = BrandRepository::new(state.pool()).list_active().await?;
    Ok(Envelope::new(brands))
}
