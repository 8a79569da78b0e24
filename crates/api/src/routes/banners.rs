//! Public banner route handlers.

use std::sync::Arc;

use axum::extract::State;
use tracing::instrument;

use crate::db::BannerRepository;
use crate::error::Result;
use crate::models::Banner;
use crate::response::Envelope;
use crate::state::AppState;

/// GET /api/banners
///
/// Cached; admin writes invalidate.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Envelope<Vec<Banner>>> {
    if let Some(banners) = state.banner_cache().get(&0).await {
        return Ok(Envelope::new(banners.as_ref().clone()));
    }

    let banners = Arc::new(BannerRepository::new(state.pool()).list_active().await?);
    state.banner_cache().insert(0, Arc::clone(&banners)).await;

    Ok(Envelope::new(banners.as_ref().clone()))
}
