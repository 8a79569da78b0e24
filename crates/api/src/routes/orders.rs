//! Order route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use sundry_core::AddressId;

use crate::db::{AddressRepository, OrderRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::order::{Order, OrderView, ShippingAddress};
use crate::models::CurrentUser;
use crate::response::{Created, Envelope, PageRequest, Pagination};
use crate::services::checkout::CheckoutService;
use crate::state::AppState;

/// Checkout request: an inline shipping address or a saved address id.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub shipping_address: Option<ShippingAddress>,
    pub address_id: Option<AddressId>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Resolve the shipping destination from the request body.
async fn resolve_shipping(
    state: &AppState,
    user: &CurrentUser,
    body: CreateOrderRequest,
) -> Result<ShippingAddress> {
    let shipping = match (body.shipping_address, body.address_id) {
        (Some(shipping), _) => shipping,
        (None, Some(address_id)) => {
            let address = AddressRepository::new(state.pool())
                .get_for_user(user.id, address_id)
                .await?
                .ok_or_else(|| AppError::NotFound("address not found".to_owned()))?;
            ShippingAddress::from(&address)
        }
        (None, None) => {
            return Err(AppError::BadRequest(
                "shipping_address or address_id is required".to_owned(),
            ));
        }
    };

    shipping
        .validate()
        .map_err(|field| AppError::BadRequest(format!("shipping address is missing {field}")))?;

    Ok(shipping)
}

/// POST /api/orders
///
/// Converts the caller's cart into an order (see
/// [`CheckoutService::create_order`] for the transactional contract), then
/// sends a confirmation email. Email failures are logged, never surfaced.
#[instrument(skip(state, user, body))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<CreateOrderRequest>,
) -> Result<Created<OrderView>> {
    let shipping = resolve_shipping(&state, &user, body).await?;

    let view = CheckoutService::new(state.pool())
        .create_order(user.id, &shipping)
        .await?;

    // Post-commit side effect: best-effort only
    if let Err(e) = state.email().send_order_confirmation(&user.email, &view).await {
        tracing::warn!(
            order_number = %view.order.order_number,
            error = %e,
            "Failed to send order confirmation email"
        );
    }

    Ok(Created(view))
}

/// GET /api/orders
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(params): Query<ListParams>,
) -> Result<Envelope<Vec<Order>>> {
    let page = PageRequest::from_params(params.page, params.limit);

    let (orders, total) = OrderRepository::new(state.pool())
        .list_for_user(user.id, page.limit, page.offset())
        .await?;

    Ok(Envelope::paginated(
        orders,
        Pagination::new(page.page, page.limit, total),
    ))
}

/// Fetch an order by number, enforcing ownership (admins may fetch any).
async fn load_owned_order(
    state: &AppState,
    user: &CurrentUser,
    order_number: &str,
) -> Result<Order> {
    let order = OrderRepository::new(state.pool())
        .get_by_number(order_number)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_number} not found")))?;

    if order.user_id != user.id && !user.is_admin() {
        // Not-found, not forbidden: don't confirm foreign order numbers
        return Err(AppError::NotFound(format!("order {order_number} not found")));
    }

    Ok(order)
}

/// GET /api/orders/{order_number}
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(order_number): Path<String>,
) -> Result<Envelope<OrderView>> {
    let order = load_owned_order(&state, &user, &order_number).await?;
    let items = OrderRepository::new(state.pool()).get_items(order.id).await?;

    Ok(Envelope::new(OrderView { order, items }))
}

/// POST /api/orders/{order_number}/cancel
///
/// Only pending, unpaid orders can be cancelled; stock is restored in the
/// same transaction.
#[instrument(skip(state, user))]
pub async fn cancel(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(order_number): Path<String>,
) -> Result<Envelope<Value>> {
    let order = load_owned_order(&state, &user, &order_number).await?;

    let cancelled = CheckoutService::new(state.pool())
        .cancel_order(order.id)
        .await?;
    if !cancelled {
        return Err(AppError::Conflict(
            "only pending, unpaid orders can be cancelled".to_owned(),
        ));
    }

    Ok(Envelope::new(json!({ "message": "order cancelled" })))
}
