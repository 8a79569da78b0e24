//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::models::{Banner, CategoryNode};
use crate::services::email::EmailService;
use crate::services::payments::PaymentClient;

/// Catalog read cache TTL. Admin writes invalidate eagerly; the TTL only
/// bounds staleness across multiple server instances.
const CATALOG_CACHE_TTL: Duration = Duration::from_secs(60);

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    payments: PaymentClient,
    email: EmailService,
    category_cache: Cache<u8, Arc<Vec<CategoryNode>>>,
    banner_cache: Cache<u8, Arc<Vec<Banner>>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ApiConfig, pool: PgPool, email: EmailService) -> Self {
        let payments = PaymentClient::new(&config.payment);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                payments,
                email,
                category_cache: Cache::builder().time_to_live(CATALOG_CACHE_TTL).build(),
                banner_cache: Cache::builder().time_to_live(CATALOG_CACHE_TTL).build(),
            }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the payment processor client.
    #[must_use]
    pub fn payments(&self) -> &PaymentClient {
        &self.inner.payments
    }

    /// Get a reference to the email service.
    #[must_use]
    pub fn email(&self) -> &EmailService {
        &self.inner.email
    }

    /// The cached category tree slot.
    #[must_use]
    pub fn category_cache(&self) -> &Cache<u8, Arc<Vec<CategoryNode>>> {
        &self.inner.category_cache
    }

    /// The cached active-banner slot.
    #[must_use]
    pub fn banner_cache(&self) -> &Cache<u8, Arc<Vec<Banner>>> {
        &self.inner.banner_cache
    }

    /// Drop cached catalog reads after an admin write.
    pub async fn invalidate_catalog_cache(&self) {
        self.inner.category_cache.invalidate(&0).await;
        self.inner.banner_cache.invalidate(&0).await;
    }
}
