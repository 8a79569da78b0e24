//! Admin (back-office) route handlers.
//!
//! Same CRUD primitives as the public catalog, gated by the admin role via
//! the [`RequireAdmin`](crate::middleware::RequireAdmin) extractor on every
//! handler.

pub mod banners;
pub mod brands;
pub mod categories;
pub mod coupons;
pub mod orders;
pub mod products;
pub mod users;

use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

/// Build the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/products",
            get(products::index).post(products::create),
        )
        .route(
            "/products/{id}",
            put(products::update).delete(products::delete),
        )
        .route(
            "/categories",
            get(categories::index).post(categories::create),
        )
        .route(
            "/categories/{id}",
            put(categories::update).delete(categories::delete),
        )
        .route("/brands", get(brands::index).post(brands::create))
        .route("/brands/{id}", put(brands::update).delete(brands::delete))
        .route("/orders", get(orders::index))
        .route("/orders/{order_number}", get(orders::show))
        .route("/orders/{order_number}/status", put(orders::update_status))
        .route(
            "/orders/{order_number}/payment-status",
            put(orders::update_payment_status),
        )
        .route("/banners", get(banners::index).post(banners::create))
        .route(
            "/banners/{id}",
            put(banners::update).delete(banners::delete),
        )
        .route("/coupons", get(coupons::index).post(coupons::create))
        .route(
            "/coupons/{id}",
            put(coupons::update).delete(coupons::delete),
        )
        .route("/users", get(users::index))
}
