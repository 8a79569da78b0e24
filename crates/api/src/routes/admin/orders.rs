//! Admin order management.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use sundry_core::{OrderStatus, PaymentStatus};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::order::{Order, OrderView};
use crate::response::{Envelope, PageRequest, Pagination};
use crate::services::checkout::CheckoutService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePaymentStatusRequest {
    pub payment_status: PaymentStatus,
}

/// GET /api/admin/orders
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<ListParams>,
) -> Result<Envelope<Vec<Order>>> {
    let page = PageRequest::from_params(params.page, params.limit);

    let (orders, total) = OrderRepository::new(state.pool())
        .list_all(params.status, page.limit, page.offset())
        .await?;

    Ok(Envelope::paginated(
        orders,
        Pagination::new(page.page, page.limit, total),
    ))
}

/// GET /api/admin/orders/{order_number}
#[instrument(skip(state, _admin))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(order_number): Path<String>,
) -> Result<Envelope<OrderView>> {
    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get_by_number(&order_number)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_number} not found")))?;
    let items = orders.get_items(order.id).await?;

    Ok(Envelope::new(OrderView { order, items }))
}

/// PUT /api/admin/orders/{order_number}/status
///
/// Status only moves along the lifecycle. Cancellation goes through the
/// checkout service so stock is restored.
#[instrument(skip(state, _admin, body))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(order_number): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Envelope<Order>> {
    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get_by_number(&order_number)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_number} not found")))?;

    if !order.status.can_transition_to(body.status) {
        return Err(AppError::Conflict(format!(
            "cannot move order from {:?} to {:?}",
            order.status, body.status
        )));
    }

    if body.status == OrderStatus::Cancelled {
        let cancelled = CheckoutService::new(state.pool())
            .cancel_order(order.id)
            .await?;
        if !cancelled {
            return Err(AppError::Conflict(
                "only pending, unpaid orders can be cancelled".to_owned(),
            ));
        }
    } else {
        orders.set_status(order.id, body.status).await?;
    }

    let updated = orders
        .get_by_id(order.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_number} not found")))?;

    Ok(Envelope::new(updated))
}

/// PUT /api/admin/orders/{order_number}/payment-status
///
/// Manual override for support cases (e.g. a bank transfer settled outside
/// the processor).
#[instrument(skip(state, _admin, body))]
pub async fn update_payment_status(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(order_number): Path<String>,
    Json(body): Json<UpdatePaymentStatusRequest>,
) -> Result<Envelope<Order>> {
    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get_by_number(&order_number)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_number} not found")))?;

    orders
        .set_payment_status(order.id, body.payment_status, None)
        .await?;

    let updated = orders
        .get_by_id(order.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_number} not found")))?;

    Ok(Envelope::new(updated))
}
