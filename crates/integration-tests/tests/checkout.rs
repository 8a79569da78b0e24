//! Checkout consistency tests.
//!
//! These cover the order-creation contract: atomicity, snapshot totals,
//! stock decrement, cart clearing, and the failure paths that must leave
//! no partial effect. Skipped unless `SUNDRY_TEST_BASE_URL` (and admin
//! credentials for fixture setup) are configured.

use serde_json::json;

use sundry_core::OrderNumber;
use sundry_integration_tests::{
    admin_client, base_url, create_product, product_stock, register_customer,
};

fn shipping() -> serde_json::Value {
    json!({
        "shipping_address": {
            "recipient": "Test Customer",
            "line1": "1 Main St",
            "city": "Springfield",
            "postal_code": "12345",
            "country": "US"
        }
    })
}

#[tokio::test]
async fn empty_cart_checkout_fails_without_order() {
    let Some(base) = base_url() else { return };
    let customer = register_customer(&base).await;

    let (status, body) = customer.post("/api/orders", &shipping()).await;

    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "empty_cart");

    // No order row was written
    let (status, orders) = customer.get("/api/orders").await;
    assert_eq!(status, 200);
    assert_eq!(orders["pagination"]["total"], 0);
}

#[tokio::test]
async fn successful_checkout_snapshots_total_and_decrements_stock() {
    let Some(base) = base_url() else { return };
    let Some(admin) = admin_client(&base).await else { return };

    // The worked example: 2 x $10 (stock 5) + 1 x $20 (stock 1)
    let (product_a, slug_a) = create_product(&admin, "10.00", 5).await;
    let (product_b, slug_b) = create_product(&admin, "20.00", 1).await;

    let customer = register_customer(&base).await;
    let (status, _) = customer
        .post("/api/cart/items", &json!({ "product_id": product_a, "quantity": 2 }))
        .await;
    assert_eq!(status, 200);
    let (status, _) = customer
        .post("/api/cart/items", &json!({ "product_id": product_b, "quantity": 1 }))
        .await;
    assert_eq!(status, 200);

    let (status, body) = customer.post("/api/orders", &shipping()).await;
    assert_eq!(status, 201, "checkout failed: {body}");
    assert_eq!(body["success"], true);

    // Total is the snapshot sum
    assert_eq!(body["data"]["total_amount"], "40.00");
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["payment_status"], "pending");
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);

    // Order number format: ORD-YYYYMMDD-XXXXX
    let order_number = body["data"]["order_number"].as_str().unwrap();
    assert!(
        OrderNumber::parse(order_number).is_some(),
        "malformed order number {order_number}"
    );

    // Stock decreased by exactly the purchased quantities
    assert_eq!(product_stock(&base, &slug_a).await, 3);
    assert_eq!(product_stock(&base, &slug_b).await, 0);

    // Cart is empty afterwards
    let (status, cart) = customer.get("/api/cart").await;
    assert_eq!(status, 200);
    assert_eq!(cart["data"]["item_count"], 0);
    assert_eq!(cart["data"]["subtotal"], "0");
}

#[tokio::test]
async fn insufficient_stock_leaves_no_partial_effect() {
    let Some(base) = base_url() else { return };
    let Some(admin) = admin_client(&base).await else { return };

    let (product_ok, slug_ok) = create_product(&admin, "5.00", 10).await;
    let (product_scarce, slug_scarce) = create_product(&admin, "7.50", 3).await;

    let customer = register_customer(&base).await;
    let (status, _) = customer
        .post("/api/cart/items", &json!({ "product_id": product_ok, "quantity": 1 }))
        .await;
    assert_eq!(status, 200);
    let (status, _) = customer
        .post("/api/cart/items", &json!({ "product_id": product_scarce, "quantity": 3 }))
        .await;
    assert_eq!(status, 200);

    // Stock drops to zero after the cart was filled (e.g. another shopper
    // got there first)
    let (status, product) = admin.get(&format!("/api/products/{slug_scarce}")).await;
    assert_eq!(status, 200);
    let (status, body) = admin
        .put(
            &format!("/api/admin/products/{product_scarce}"),
            &json!({
                "name": product["data"]["name"],
                "slug": slug_scarce,
                "price": "7.50",
                "stock": 0,
                "category_id": product["data"]["category_id"],
            }),
        )
        .await;
    assert_eq!(status, 200, "stock update failed: {body}");

    let (status, body) = customer.post("/api/orders", &shipping()).await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "insufficient_stock");
    // The error names the offending product
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .contains(product["data"]["name"].as_str().unwrap())
    );

    // Nothing changed: stock, cart, and order count are untouched
    assert_eq!(product_stock(&base, &slug_ok).await, 10);
    assert_eq!(product_stock(&base, &slug_scarce).await, 0);

    let (_, cart) = customer.get("/api/cart").await;
    assert_eq!(cart["data"]["items"].as_array().unwrap().len(), 2);

    let (_, orders) = customer.get("/api/orders").await;
    assert_eq!(orders["pagination"]["total"], 0);
}

#[tokio::test]
async fn order_numbers_are_unique_across_orders() {
    let Some(base) = base_url() else { return };
    let Some(admin) = admin_client(&base).await else { return };

    let (product, _) = create_product(&admin, "1.00", 50).await;
    let customer = register_customer(&base).await;

    let mut seen = std::collections::HashSet::new();
    for _ in 0..5 {
        let (status, _) = customer
            .post("/api/cart/items", &json!({ "product_id": product, "quantity": 1 }))
            .await;
        assert_eq!(status, 200);

        let (status, body) = customer.post("/api/orders", &shipping()).await;
        assert_eq!(status, 201);

        let number = body["data"]["order_number"].as_str().unwrap().to_owned();
        assert!(seen.insert(number), "duplicate order number");
    }
}

#[tokio::test]
async fn cancelling_pending_order_restores_stock() {
    let Some(base) = base_url() else { return };
    let Some(admin) = admin_client(&base).await else { return };

    let (product, slug) = create_product(&admin, "12.00", 4).await;
    let customer = register_customer(&base).await;

    let (status, _) = customer
        .post("/api/cart/items", &json!({ "product_id": product, "quantity": 3 }))
        .await;
    assert_eq!(status, 200);

    let (status, body) = customer.post("/api/orders", &shipping()).await;
    assert_eq!(status, 201);
    let order_number = body["data"]["order_number"].as_str().unwrap().to_owned();
    assert_eq!(product_stock(&base, &slug).await, 1);

    let (status, _) = customer
        .post(&format!("/api/orders/{order_number}/cancel"), &json!({}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(product_stock(&base, &slug).await, 4);

    // A second cancel is rejected: the order is no longer pending
    let (status, body) = customer
        .post(&format!("/api/orders/{order_number}/cancel"), &json!({}))
        .await;
    assert_eq!(status, 409, "unexpected: {body}");
}

#[tokio::test]
async fn cart_subtotal_recomputes_on_read() {
    let Some(base) = base_url() else { return };
    let Some(admin) = admin_client(&base).await else { return };

    let (product, _) = create_product(&admin, "9.99", 10).await;
    let customer = register_customer(&base).await;

    let (status, cart) = customer
        .post("/api/cart/items", &json!({ "product_id": product, "quantity": 2 }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(cart["data"]["subtotal"], "19.98");
    assert_eq!(cart["data"]["items"][0]["line_total"], "19.98");

    // Over-stock adds are rejected at mutation time
    let (status, body) = customer
        .post("/api/cart/items", &json!({ "product_id": product, "quantity": 9 }))
        .await;
    assert_eq!(status, 400, "unexpected: {body}");
}
