//! Auth flow, envelope shape, and catalog browsing tests.

use serde_json::json;

use sundry_integration_tests::{
    ApiClient, admin_client, base_url, create_product, register_customer, unique_email,
};

#[tokio::test]
async fn health_endpoints_respond() {
    let Some(base) = base_url() else { return };
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/health")).send().await.expect("send");
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.text().await.expect("body"), "ok");

    let resp = client
        .get(format!("{base}/health/ready"))
        .send()
        .await
        .expect("send");
    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn register_login_profile_roundtrip() {
    let Some(base) = base_url() else { return };

    let email = unique_email("roundtrip");
    let anon = ApiClient::anonymous(base.clone());

    let (status, body) = anon
        .post(
            "/api/auth/register",
            &json!({ "email": email, "password": "test-password-1", "full_name": "Jo Doe" }),
        )
        .await;
    assert_eq!(status, 201);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["email"], email);
    assert_eq!(body["data"]["user"]["role"], "customer");
    assert_eq!(body["data"]["user"]["email_verified"], false);

    // Duplicate registration conflicts
    let (status, body) = anon
        .post(
            "/api/auth/register",
            &json!({ "email": email, "password": "test-password-1", "full_name": "Jo Doe" }),
        )
        .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "conflict");

    // Wrong password is a 401 with the envelope error shape
    let (status, body) = anon
        .post(
            "/api/auth/login",
            &json!({ "email": email, "password": "wrong-password" }),
        )
        .await;
    assert_eq!(status, 401);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "unauthorized");

    let customer = sundry_integration_tests::login(&base, &email, "test-password-1").await;
    let (status, body) = customer.get("/api/account/profile").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["full_name"], "Jo Doe");
}

#[tokio::test]
async fn refresh_token_rotation() {
    let Some(base) = base_url() else { return };

    let email = unique_email("refresh");
    let anon = ApiClient::anonymous(base.clone());
    let (status, _) = anon
        .post(
            "/api/auth/register",
            &json!({ "email": email, "password": "test-password-1", "full_name": "Jo" }),
        )
        .await;
    assert_eq!(status, 201);

    let (_, body) = anon
        .post(
            "/api/auth/login",
            &json!({ "email": email, "password": "test-password-1" }),
        )
        .await;
    let refresh_token = body["data"]["tokens"]["refresh_token"].as_str().expect("token");

    let (status, body) = anon
        .post("/api/auth/refresh", &json!({ "refresh_token": refresh_token }))
        .await;
    assert_eq!(status, 200);
    assert!(body["data"]["access_token"].is_string());

    // The presented refresh token was rotated out
    let (status, _) = anon
        .post("/api/auth/refresh", &json!({ "refresh_token": refresh_token }))
        .await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn protected_routes_reject_anonymous_and_non_admin_callers() {
    let Some(base) = base_url() else { return };
    let anon = ApiClient::anonymous(base.clone());

    let (status, body) = anon.get("/api/cart").await;
    assert_eq!(status, 401);
    assert_eq!(body["error"]["code"], "unauthorized");

    let customer = register_customer(&base).await;
    let (status, body) = customer.get("/api/admin/orders").await;
    assert_eq!(status, 403);
    assert_eq!(body["error"]["code"], "forbidden");
}

#[tokio::test]
async fn product_listing_filters_and_paginates() {
    let Some(base) = base_url() else { return };
    let Some(admin) = admin_client(&base).await else { return };

    let (_, slug) = create_product(&admin, "33.00", 5).await;
    let anon = ApiClient::anonymous(base.clone());

    // Search by the generated slug suffix (also in the product name)
    let needle = &slug["product-".len()..];
    let (status, body) = anon.get(&format!("/api/products?q={needle}")).await;
    assert_eq!(status, 200);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["slug"], slug);

    // Pagination metadata is consistent
    let (status, body) = anon.get("/api/products?page=1&limit=2").await;
    assert_eq!(status, 200);
    assert_eq!(body["pagination"]["limit"], 2);
    assert!(body["data"].as_array().expect("array").len() <= 2);

    // Unknown products are a 404 in the envelope shape
    let (status, body) = anon.get("/api/products/definitely-not-a-slug").await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn soft_deleted_products_vanish_from_public_listing() {
    let Some(base) = base_url() else { return };
    let Some(admin) = admin_client(&base).await else { return };

    let (product_id, slug) = create_product(&admin, "21.00", 5).await;
    let anon = ApiClient::anonymous(base.clone());

    let (status, _) = anon.get(&format!("/api/products/{slug}")).await;
    assert_eq!(status, 200);

    let (status, _) = admin.delete(&format!("/api/admin/products/{product_id}")).await;
    assert_eq!(status, 200);

    let (status, _) = anon.get(&format!("/api/products/{slug}")).await;
    assert_eq!(status, 404);
}
