//! Payment webhook tests: signature enforcement and idempotent delivery.
//!
//! Requires `SUNDRY_TEST_WEBHOOK_SECRET` to match the server's
//! `PAYMENT_WEBHOOK_SECRET` (in addition to the base URL and admin
//! credentials); skipped otherwise.

use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;

use sundry_integration_tests::{
    ApiClient, admin_client, base_url, create_product, register_customer, webhook_secret,
};

type HmacSha256 = Hmac<Sha256>;

/// Sign a payload the way the processor does.
fn sign(payload: &str, secret: &str) -> String {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_secs();

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac key");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());

    format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
}

async fn post_webhook(base: &str, payload: &str, signature: Option<&str>) -> (u16, serde_json::Value) {
    let client = reqwest::Client::new();
    let mut builder = client
        .post(format!("{base}/api/webhooks/payment"))
        .header("content-type", "application/json")
        .body(payload.to_owned());
    if let Some(signature) = signature {
        builder = builder.header("Payment-Signature", signature);
    }

    let resp = builder.send().await.expect("send");
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap_or(serde_json::Value::Null))
}

/// Place an order and return `(customer, order_number, order_id)`.
async fn place_order(base: &str, admin: &ApiClient) -> (ApiClient, String, i64) {
    let (product, _) = create_product(admin, "15.00", 5).await;
    let customer = register_customer(base).await;

    let (status, _) = customer
        .post("/api/cart/items", &json!({ "product_id": product, "quantity": 1 }))
        .await;
    assert_eq!(status, 200);

    let (status, body) = customer
        .post(
            "/api/orders",
            &json!({ "shipping_address": {
                "recipient": "Test Customer", "line1": "1 Main St", "city": "Springfield",
                "postal_code": "12345", "country": "US"
            }}),
        )
        .await;
    assert_eq!(status, 201);

    let order_number = body["data"]["order_number"].as_str().expect("number").to_owned();
    let order_id = body["data"]["id"].as_i64().expect("id");
    (customer, order_number, order_id)
}

fn succeeded_event(event_id: &str, order_id: i64) -> String {
    json!({
        "id": event_id,
        "type": "payment_intent.succeeded",
        "data": { "object": {
            "id": format!("pi_{event_id}"),
            "metadata": { "order_id": order_id.to_string() }
        }}
    })
    .to_string()
}

#[tokio::test]
async fn unsigned_and_badly_signed_webhooks_are_rejected() {
    let Some(base) = base_url() else { return };
    let Some(admin) = admin_client(&base).await else { return };
    if webhook_secret().is_none() {
        return;
    }

    let (_, _, order_id) = place_order(&base, &admin).await;
    let payload = succeeded_event("evt_bad_sig", order_id);

    let (status, _) = post_webhook(&base, &payload, None).await;
    assert_eq!(status, 400);

    let (status, body) = post_webhook(&base, &payload, Some("t=1,v1=deadbeef")).await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn payment_succeeded_marks_order_paid_once() {
    let Some(base) = base_url() else { return };
    let Some(admin) = admin_client(&base).await else { return };
    let Some(secret) = webhook_secret() else { return };

    let (customer, order_number, order_id) = place_order(&base, &admin).await;

    let event_id = format!("evt_{}", uuid::Uuid::new_v4().simple());
    let payload = succeeded_event(&event_id, order_id);

    // First delivery: applied
    let (status, _) = post_webhook(&base, &payload, Some(&sign(&payload, &secret))).await;
    assert_eq!(status, 200);

    let (_, body) = customer.get(&format!("/api/orders/{order_number}")).await;
    assert_eq!(body["data"]["payment_status"], "paid");
    assert_eq!(body["data"]["status"], "processing");

    // The paid order can no longer be cancelled
    let (status, _) = customer
        .post(&format!("/api/orders/{order_number}/cancel"), &json!({}))
        .await;
    assert_eq!(status, 409);

    // Admin moves it along; a duplicate delivery must not drag it back
    let (status, _) = admin
        .put(
            &format!("/api/admin/orders/{order_number}/status"),
            &json!({ "status": "shipped" }),
        )
        .await;
    assert_eq!(status, 200);

    let (status, _) = post_webhook(&base, &payload, Some(&sign(&payload, &secret))).await;
    assert_eq!(status, 200);

    let (_, body) = customer.get(&format!("/api/orders/{order_number}")).await;
    assert_eq!(
        body["data"]["status"], "shipped",
        "duplicate delivery re-applied its effect"
    );
}

#[tokio::test]
async fn unhandled_event_types_are_acknowledged() {
    let Some(base) = base_url() else { return };
    let Some(secret) = webhook_secret() else { return };

    let payload = json!({
        "id": format!("evt_{}", uuid::Uuid::new_v4().simple()),
        "type": "charge.dispute.created",
        "data": { "object": { "id": "dp_1" } }
    })
    .to_string();

    // Acknowledged with 200 so the processor stops redelivering
    let (status, body) = post_webhook(&base, &payload, Some(&sign(&payload, &secret))).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["received"], true);
}
