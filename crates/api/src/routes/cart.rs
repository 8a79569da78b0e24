//! Cart route handlers.
//!
//! Every response carries the full recomputed cart view so clients never
//! have to track line totals themselves.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::instrument;

use sundry_core::{CartItemId, ProductId};

use crate::db::{CartRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::CartView;
use crate::response::Envelope;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i32,
}

/// Load the caller's full cart view.
async fn load_cart_view(state: &AppState, user: &crate::models::CurrentUser) -> Result<CartView> {
    let carts = CartRepository::new(state.pool());
    let cart = carts.get_or_create(user.id).await?;
    let lines = carts.get_lines(cart.id).await?;
    Ok(CartView::from_lines(lines))
}

/// GET /api/cart
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Envelope<CartView>> {
    Ok(Envelope::new(load_cart_view(&state, &user).await?))
}

/// POST /api/cart/items
///
/// Accumulates quantity when the product is already in the cart. The
/// accumulated quantity must not exceed live stock.
#[instrument(skip(state, user))]
pub async fn add_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<AddItemRequest>,
) -> Result<Envelope<CartView>> {
    let quantity = body.quantity.unwrap_or(1);
    if quantity < 1 {
        return Err(AppError::BadRequest("quantity must be at least 1".to_owned()));
    }

    let product = ProductRepository::new(state.pool())
        .get_by_id(body.product_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| AppError::NotFound("product not found".to_owned()))?;

    let carts = CartRepository::new(state.pool());
    let cart = carts.get_or_create(user.id).await?;

    let existing = carts
        .get_item_quantity(cart.id, product.id)
        .await?
        .unwrap_or(0);
    if existing + quantity > product.stock {
        return Err(AppError::BadRequest(format!(
            "only {} units of {} in stock",
            product.stock, product.name
        )));
    }

    carts.upsert_item(cart.id, product.id, quantity).await?;

    Ok(Envelope::new(load_cart_view(&state, &user).await?))
}

/// PUT /api/cart/items/{item_id}
#[instrument(skip(state, user))]
pub async fn update_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(item_id): Path<CartItemId>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Envelope<CartView>> {
    if body.quantity < 1 {
        return Err(AppError::BadRequest(
            "quantity must be at least 1; delete the line to remove it".to_owned(),
        ));
    }

    let carts = CartRepository::new(state.pool());
    let cart = carts.get_or_create(user.id).await?;

    let item = carts
        .get_item(cart.id, item_id)
        .await?
        .ok_or_else(|| AppError::NotFound("cart item not found".to_owned()))?;

    let product = ProductRepository::new(state.pool())
        .get_by_id(item.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_owned()))?;

    if body.quantity > product.stock {
        return Err(AppError::BadRequest(format!(
            "only {} units of {} in stock",
            product.stock, product.name
        )));
    }

    carts
        .set_item_quantity(cart.id, item_id, body.quantity)
        .await?;

    Ok(Envelope::new(load_cart_view(&state, &user).await?))
}

/// DELETE /api/cart/items/{item_id}
#[instrument(skip(state, user))]
pub async fn remove_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(item_id): Path<CartItemId>,
) -> Result<Envelope<CartView>> {
    let carts = CartRepository::new(state.pool());
    let cart = carts.get_or_create(user.id).await?;

    if !carts.remove_item(cart.id, item_id).await? {
        return Err(AppError::NotFound("cart item not found".to_owned()));
    }

    Ok(Envelope::new(load_cart_view(&state, &user).await?))
}

/// DELETE /api/cart
#[instrument(skip(state, user))]
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Envelope<CartView>> {
    let carts = CartRepository::new(state.pool());
    let cart = carts.get_or_create(user.id).await?;
    carts.clear(cart.id).await?;

    Ok(Envelope::new(CartView::from_lines(Vec::new())))
}
