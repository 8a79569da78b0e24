//! Integration test harness for Sundry.
//!
//! These tests exercise a running server over HTTP; they are skipped unless
//! the environment points at one.
//!
//! # Running
//!
//! ```bash
//! # Terminal 1: database + migrations + server
//! cargo run -p sundry-cli -- migrate
//! cargo run -p sundry-cli -- admin create -e admin@test.local -n Admin -p <password>
//! cargo run -p sundry-api
//!
//! # Terminal 2
//! SUNDRY_TEST_BASE_URL=http://localhost:3000 \
//! SUNDRY_TEST_ADMIN_EMAIL=admin@test.local \
//! SUNDRY_TEST_ADMIN_PASSWORD=<password> \
//! cargo test -p sundry-integration-tests
//! ```
//!
//! `SUNDRY_TEST_WEBHOOK_SECRET` (matching the server's
//! `PAYMENT_WEBHOOK_SECRET`) additionally enables the webhook tests.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use reqwest::Client;
use serde_json::{Value, json};

/// Base URL of the server under test, if configured.
#[must_use]
pub fn base_url() -> Option<String> {
    std::env::var("SUNDRY_TEST_BASE_URL").ok()
}

/// Webhook signing secret, if configured.
#[must_use]
pub fn webhook_secret() -> Option<String> {
    std::env::var("SUNDRY_TEST_WEBHOOK_SECRET").ok()
}

/// A unique email for a throwaway test account.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@test.local", uuid::Uuid::new_v4().simple())
}

/// A unique slug for a throwaway catalog entity.
#[must_use]
pub fn unique_slug(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}

/// An authenticated API client bound to one bearer token.
pub struct ApiClient {
    http: Client,
    base: String,
    token: Option<String>,
}

impl ApiClient {
    /// Anonymous client.
    #[must_use]
    pub fn anonymous(base: String) -> Self {
        Self {
            http: Client::new(),
            base,
            token: None,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.http.request(method, format!("{}{path}", self.base));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// GET, returning status and parsed envelope.
    pub async fn get(&self, path: &str) -> (u16, Value) {
        let resp = self.request(reqwest::Method::GET, path).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    /// POST a JSON body, returning status and parsed envelope.
    pub async fn post(&self, path: &str, body: &Value) -> (u16, Value) {
        let resp = self
            .request(reqwest::Method::POST, path)
            .json(body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    /// PUT a JSON body, returning status and parsed envelope.
    pub async fn put(&self, path: &str, body: &Value) -> (u16, Value) {
        let resp = self
            .request(reqwest::Method::PUT, path)
            .json(body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    /// DELETE, returning status and parsed envelope.
    pub async fn delete(&self, path: &str) -> (u16, Value) {
        let resp = self
            .request(reqwest::Method::DELETE, path)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }
}

/// Register a fresh customer and return a logged-in client.
pub async fn register_customer(base: &str) -> ApiClient {
    let email = unique_email("customer");
    let anon = ApiClient::anonymous(base.to_owned());

    let (status, _) = anon
        .post(
            "/api/auth/register",
            &json!({ "email": email, "password": "test-password-1", "full_name": "Test Customer" }),
        )
        .await;
    assert_eq!(status, 201, "register failed");

    login(base, &email, "test-password-1").await
}

/// Login and return an authenticated client.
pub async fn login(base: &str, email: &str, password: &str) -> ApiClient {
    let anon = ApiClient::anonymous(base.to_owned());
    let (status, body) = anon
        .post(
            "/api/auth/login",
            &json!({ "email": email, "password": password }),
        )
        .await;
    assert_eq!(status, 200, "login failed: {body}");

    let token = body["data"]["tokens"]["access_token"]
        .as_str()
        .unwrap()
        .to_owned();

    ApiClient {
        http: Client::new(),
        base: base.to_owned(),
        token: Some(token),
    }
}

/// Login as the configured test admin, if credentials are present.
pub async fn admin_client(base: &str) -> Option<ApiClient> {
    let email = std::env::var("SUNDRY_TEST_ADMIN_EMAIL").ok()?;
    let password = std::env::var("SUNDRY_TEST_ADMIN_PASSWORD").ok()?;
    Some(login(base, &email, &password).await)
}

/// Create a category + product fixture via the admin API. Returns
/// `(product_id, slug)`.
pub async fn create_product(admin: &ApiClient, price: &str, stock: i64) -> (i64, String) {
    let category_slug = unique_slug("cat");
    let (status, category) = admin
        .post(
            "/api/admin/categories",
            &json!({ "name": "Test Category", "slug": category_slug }),
        )
        .await;
    assert_eq!(status, 201, "category create failed: {category}");
    let category_id = category["data"]["id"].as_i64().unwrap();

    let slug = unique_slug("product");
    let (status, product) = admin
        .post(
            "/api/admin/products",
            &json!({
                "name": format!("Product {slug}"),
                "slug": slug,
                "price": price,
                "stock": stock,
                "category_id": category_id,
            }),
        )
        .await;
    assert_eq!(status, 201, "product create failed: {product}");

    (product["data"]["id"].as_i64().unwrap(), slug)
}

/// Read a product's live stock via the public detail endpoint.
pub async fn product_stock(base: &str, slug: &str) -> i64 {
    let anon = ApiClient::anonymous(base.to_owned());
    let (status, body) = anon.get(&format!("/api/products/{slug}")).await;
    assert_eq!(status, 200, "product fetch failed: {body}");
    body["data"]["stock"].as_i64().unwrap()
}
