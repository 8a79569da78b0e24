//! Payment processor webhook.
//!
//! The processor POSTs signed events here. The signature is verified over
//! the raw body before anything is parsed; unverified payloads are never
//! trusted. Handled events apply exactly once (duplicate deliveries are
//! detected by event id); unhandled event types are logged and acknowledged
//! with 200 so the processor does not keep redelivering them.

use axum::{body::Bytes, extract::State, http::HeaderMap};
use serde_json::{Value, json};
use secrecy::ExposeSecret;
use tracing::instrument;

use sundry_core::{OrderStatus, PaymentStatus};

use crate::db::{OrderRepository, PaymentEventRepository};
use crate::error::{AppError, Result};
use crate::response::Envelope;
use crate::services::payments::{self, WebhookEvent};
use crate::state::AppState;

/// Signature header set by the payment processor.
const SIGNATURE_HEADER: &str = "Payment-Signature";

/// POST /api/webhooks/payment
#[instrument(skip(state, headers, body))]
pub async fn payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Envelope<Value>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("missing signature header".to_owned()))?;

    payments::verify_signature(
        &body,
        signature,
        state.config().payment.webhook_secret.expose_secret(),
        chrono::Utc::now().timestamp(),
    )
    .map_err(|e| {
        tracing::warn!(error = %e, "Rejected webhook with bad signature");
        AppError::BadRequest("invalid signature".to_owned())
    })?;

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("malformed event payload: {e}")))?;

    match event.event_type.as_str() {
        "payment_intent.succeeded" => apply_payment_succeeded(&state, &event).await?,
        "payment_intent.payment_failed" => apply_payment_failed(&state, &event).await?,
        other => {
            // Acknowledge unknown types; a 4xx would cause a redelivery storm
            tracing::info!(event_type = %other, event_id = %event.id, "Ignoring unhandled webhook event");
        }
    }

    Ok(Envelope::new(json!({ "received": true })))
}

/// Mark the order paid and move it to processing. Idempotent per event id.
async fn apply_payment_succeeded(state: &AppState, event: &WebhookEvent) -> Result<()> {
    let order_id = event
        .data
        .object
        .order_id()
        .ok_or_else(|| AppError::BadRequest("event missing order_id metadata".to_owned()))?;

    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get_by_id(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;

    // First delivery wins; replays are acknowledged without re-applying
    let first_delivery = PaymentEventRepository::new(state.pool())
        .record_if_new(&event.id, order.id)
        .await?;
    if !first_delivery {
        tracing::info!(event_id = %event.id, order_number = %order.order_number,
            "Duplicate webhook delivery, skipping");
        return Ok(());
    }

    orders
        .set_payment_status(order.id, PaymentStatus::Paid, Some(OrderStatus::Processing))
        .await?;

    tracing::info!(order_number = %order.order_number, "Order marked paid");
    Ok(())
}

/// Record a failed payment attempt. Idempotent per event id.
async fn apply_payment_failed(state: &AppState, event: &WebhookEvent) -> Result<()> {
    let order_id = event
        .data
        .object
        .order_id()
        .ok_or_else(|| AppError::BadRequest("event missing order_id metadata".to_owned()))?;

    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get_by_id(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;

    let first_delivery = PaymentEventRepository::new(state.pool())
        .record_if_new(&event.id, order.id)
        .await?;
    if !first_delivery {
        return Ok(());
    }

    // A failed attempt never downgrades an order that has already been paid
    if order.payment_status != PaymentStatus::Paid {
        orders
            .set_payment_status(order.id, PaymentStatus::Failed, None)
            .await?;
        tracing::info!(order_number = %order.order_number, "Order payment failed");
    }

    Ok(())
}
