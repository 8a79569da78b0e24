//! Database access layer.
//!
//! One repository struct per aggregate, all borrowing the shared `PgPool`.
//! Queries use the runtime sqlx API with positional binds; multi-statement
//! invariants (checkout, cancellation) run inside explicit transactions in
//! the service layer.
//!
//! # Migrations
//!
//! Migrations live in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p sundry-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod addresses;
pub mod banners;
pub mod brands;
pub mod carts;
pub mod categories;
pub mod coupons;
pub mod orders;
pub mod payment_events;
pub mod products;
pub mod reviews;
pub mod tokens;
pub mod users;
pub mod wishlist;

pub use addresses::AddressRepository;
pub use banners::BannerRepository;
pub use brands::BrandRepository;
pub use carts::CartRepository;
pub use categories::CategoryRepository;
pub use coupons::CouponRepository;
pub use orders::OrderRepository;
pub use payment_events::PaymentEventRepository;
pub use products::{ProductFilter, ProductRepository, ProductSort};
pub use reviews::ReviewRepository;
pub use tokens::TokenRepository;
pub use users::UserRepository;
pub use wishlist::WishlistRepository;

/// Errors from the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored value failed domain validation on read.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

impl RepositoryError {
    /// Map a unique-constraint violation to `Conflict`, everything else to
    /// `Database`.
    #[must_use]
    pub fn from_unique_violation(err: sqlx::Error, conflict_message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict_message.to_owned());
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
