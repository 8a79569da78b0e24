//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (DB ping)
//!
//! # Auth
//! POST /api/auth/register               - Create account, send OTP
//! POST /api/auth/login                  - Email/password -> token pair
//! POST /api/auth/verify-otp             - Verify email OTP
//! POST /api/auth/refresh                - Rotate refresh token
//! POST /api/auth/logout                 - Revoke refresh token
//! POST /api/auth/forgot-password        - Send password-reset OTP
//! POST /api/auth/reset-password         - Reset with OTP
//!
//! # Catalog (public)
//! GET  /api/products                    - List (search/filter/sort/paginate)
//! GET  /api/products/{slug}             - Product detail
//! GET  /api/products/{slug}/reviews     - Product reviews
//! POST /api/products/{slug}/reviews     - Create review (auth, purchasers)
//! GET  /api/categories                  - Active category tree (cached)
//! GET  /api/brands                      - Active brands
//! GET  /api/banners                     - Active banners (cached)
//!
//! # Cart (auth)
//! GET    /api/cart                      - Cart with recomputed subtotal
//! POST   /api/cart/items                - Add product
//! PUT    /api/cart/items/{item_id}      - Set quantity
//! DELETE /api/cart/items/{item_id}      - Remove line
//! DELETE /api/cart                      - Clear cart
//!
//! # Orders (auth)
//! POST /api/orders                      - Checkout (atomic order creation)
//! GET  /api/orders                      - Own orders
//! GET  /api/orders/{order_number}       - Own order detail
//! POST /api/orders/{order_number}/cancel - Cancel pending unpaid order
//!
//! # Payments
//! POST /api/payments/intent             - Create processor intent (auth)
//! POST /api/webhooks/payment            - Processor webhook (signed)
//!
//! # Account (auth)
//! GET  /api/account/profile             - Profile
//! PUT  /api/account/profile             - Update name
//! PUT  /api/account/password            - Change password
//! GET/POST /api/account/addresses       - Address book
//! PUT/DELETE /api/account/addresses/{id}
//! POST /api/account/addresses/{id}/default
//! GET  /api/account/wishlist            - Wishlist
//! POST /api/account/wishlist            - Add product
//! DELETE /api/account/wishlist/{product_id}
//!
//! # Admin (admin role)
//! /api/admin/products, /categories, /brands, /orders, /banners, /coupons, /users
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod banners;
pub mod brands;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod payments;
pub mod products;
pub mod reviews;
pub mod webhooks;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/verify-otp", post(auth::verify_otp))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
}

/// Create the public catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{slug}", get(products::show))
        .route(
            "/products/{slug}/reviews",
            get(reviews::index).post(reviews::create),
        )
        .route("/categories", get(categories::index))
        .route("/brands", get(brands::index))
        .route("/banners", get(banners::index))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add_item))
        .route(
            "/items/{item_id}",
            put(cart::update_item).delete(cart::remove_item),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create).get(orders::index))
        .route("/{order_number}", get(orders::show))
        .route("/{order_number}/cancel", post(orders::cancel))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(account::profile).put(account::update_profile),
        )
        .route("/password", put(account::change_password))
        .route(
            "/addresses",
            get(account::addresses).post(account::create_address),
        )
        .route(
            "/addresses/{id}",
            put(account::update_address).delete(account::delete_address),
        )
        .route("/addresses/{id}/default", post(account::set_default_address))
        .route(
            "/wishlist",
            get(account::wishlist).post(account::add_to_wishlist),
        )
        .route(
            "/wishlist/{product_id}",
            delete(account::remove_from_wishlist),
        )
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new().nest(
        "/api",
        Router::new()
            .nest("/auth", auth_routes())
            .merge(catalog_routes())
            .nest("/cart", cart_routes())
            .nest("/orders", order_routes())
            .route("/payments/intent", post(payments::create_intent))
            .route("/webhooks/payment", post(webhooks::payment))
            .nest("/account", account_routes())
            .nest("/admin", admin::routes()),
    )
}
