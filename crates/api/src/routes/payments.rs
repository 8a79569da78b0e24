//! Payment intent route handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use sundry_core::PaymentStatus;

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::response::Envelope;
use crate::services::payments::PaymentIntent;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateIntentRequest {
    pub order_number: String,
}

/// POST /api/payments/intent
///
/// Creates a processor-side transaction for the order total (in minor
/// units) and returns the client secret the storefront hands to the
/// processor's SDK.
#[instrument(skip(state, user))]
pub async fn create_intent(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<CreateIntentRequest>,
) -> Result<Envelope<PaymentIntent>> {
    let order = OrderRepository::new(state.pool())
        .get_by_number(&body.order_number)
        .await?
        .filter(|o| o.user_id == user.id)
        .ok_or_else(|| AppError::NotFound(format!("order {} not found", body.order_number)))?;

    if order.payment_status == PaymentStatus::Paid {
        return Err(AppError::BadRequest("order is already paid".to_owned()));
    }

    let intent = state
        .payments()
        .create_intent(order.id, &order.order_number, order.total_amount)
        .await?;

    Ok(Envelope::new(intent))
}
