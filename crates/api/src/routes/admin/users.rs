//! Admin user listing.

use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use crate::db::UserRepository;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::User;
use crate::response::{Envelope, PageRequest, Pagination};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// GET /api/admin/users
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<ListParams>,
) -> Result<Envelope<Vec<User>>> {
    let page = PageRequest::from_params(params.page, params.limit);

    let (users, total) = UserRepository::new(state.pool())
        .list(page.limit, page.offset())
        .await?;

    Ok(Envelope::paginated(
        users,
        Pagination::new(page.page, page.limit, total),
    ))
}
