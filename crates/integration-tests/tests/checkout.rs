//! Pricing and order placement.

#![allow(clippy::unwrap_used)]

use std::str::FromStr;

use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde_json::{Value, json};

use curbside_core::{Price, ProductId};
use curbside_integration_tests::{TestApp, address};
use curbside_storefront::db::ProductCatalog;

fn total(order: &Value) -> Decimal {
    Decimal::from_str(&order["total"].to_string()).unwrap()
}

// =============================================================================
// Pricing
// =============================================================================

#[tokio::test]
async fn test_order_priced_from_catalog() {
    let app = TestApp::new();
    let burrito = app.stock("Burrito", 950).await;
    let (token, user_id) = app.register("Ann", "ann@example.com", "secret1").await;

    let response = app
        .post(
            "/api/orders",
            Some(&token),
            json!({
                "cart": [{ "productId": burrito.id, "quantity": 2 }],
                "address": address(),
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let order = &response.body;
    assert_eq!(order["user"], user_id);
    assert_eq!(order["status"], "Pending");
    assert_eq!(total(order), Decimal::new(1900, 2));
    assert_eq!(order["items"][0]["name"], "Burrito");
    assert_eq!(order["items"][0]["quantity"], 2);
    assert_eq!(order["items"][0]["price"], json!(9.5));
    assert_eq!(order["address"]["zip"], "62701");
}

#[tokio::test]
async fn test_client_prices_ignored() {
    let app = TestApp::new();
    let burrito = app.stock("Burrito", 950).await;
    let taco = app.stock("Taco", 325).await;
    let (token, _) = app.register("Ann", "ann@example.com", "secret1").await;

    let response = app
        .post(
            "/api/orders",
            Some(&token),
            json!({
                "cart": [
                    { "productId": burrito.id, "quantity": 1, "price": 0.01, "name": "Free" },
                    { "productId": taco.id, "quantity": 3, "price": 0 },
                ],
                "address": address(),
                "total": 0.02,
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    // 9.50 + 3 * 3.25
    assert_eq!(total(&response.body), Decimal::new(1925, 2));
    assert_eq!(response.body["items"][0]["name"], "Burrito");
    assert_eq!(response.body["items"][1]["name"], "Taco");
}

#[tokio::test]
async fn test_unknown_product_creates_nothing() {
    let app = TestApp::new();
    let burrito = app.stock("Burrito", 950).await;
    let missing = ProductId::generate();
    let (token, _) = app.register("Ann", "ann@example.com", "secret1").await;

    let response = app
        .post(
            "/api/orders",
            Some(&token),
            json!({
                "cart": [
                    { "productId": burrito.id, "quantity": 1 },
                    { "productId": missing, "quantity": 1 },
                ],
                "address": address(),
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["message"],
        format!("Product not found: {missing}")
    );

    let mine = app.get("/api/orders/myorders", Some(&token)).await;
    assert_eq!(mine.body, json!([]));
}

#[tokio::test]
async fn test_malformed_product_id_is_unknown_product() {
    let app = TestApp::new();
    let burrito = app.stock("Burrito", 950).await;
    let (token, _) = app.register("Ann", "ann@example.com", "secret1").await;

    let response = app
        .post(
            "/api/orders",
            Some(&token),
            json!({
                "cart": [
                    { "productId": burrito.id, "quantity": 1 },
                    { "productId": "12345", "quantity": 1 },
                ],
                "address": address(),
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Product not found: 12345");

    let mine = app.get("/api/orders/myorders", Some(&token)).await;
    assert_eq!(mine.body, json!([]));
}

#[tokio::test]
async fn test_empty_cart_rejected() {
    let app = TestApp::new();
    let (token, _) = app.register("Ann", "ann@example.com", "secret1").await;

    let response = app
        .post(
            "/api/orders",
            Some(&token),
            json!({ "cart": [], "address": address() }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "No items in cart");
}

#[tokio::test]
async fn test_non_positive_quantity_rejected() {
    let app = TestApp::new();
    let burrito = app.stock("Burrito", 950).await;
    let (token, _) = app.register("Ann", "ann@example.com", "secret1").await;

    let response = app
        .post(
            "/api/orders",
            Some(&token),
            json!({
                "cart": [{ "productId": burrito.id, "quantity": 0 }],
                "address": address(),
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errors"][0]["path"], "cart[0].quantity");
}

#[tokio::test]
async fn test_incomplete_address_rejected() {
    let app = TestApp::new();
    let burrito = app.stock("Burrito", 950).await;
    let (token, _) = app.register("Ann", "ann@example.com", "secret1").await;

    let response = app
        .post(
            "/api/orders",
            Some(&token),
            json!({
                "cart": [{ "productId": burrito.id, "quantity": 1 }],
                "address": { "street": "1 Main St", "city": "Springfield" },
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Invalid address");
}

// =============================================================================
// Side Effects
// =============================================================================

#[tokio::test]
async fn test_checkout_clears_saved_cart() {
    let app = TestApp::new();
    let burrito = app.stock("Burrito", 950).await;
    let (token, _) = app.register("Ann", "ann@example.com", "secret1").await;

    let saved = app
        .put(
            "/api/user/cart",
            Some(&token),
            json!({ "cart": [{ "productId": burrito.id, "quantity": 2 }] }),
        )
        .await;
    assert_eq!(saved.status, StatusCode::OK);
    assert_eq!(saved.body[0]["product"]["name"], "Burrito");

    let placed = app
        .post(
            "/api/orders",
            Some(&token),
            json!({
                "cart": [{ "productId": burrito.id, "quantity": 2 }],
                "address": address(),
            }),
        )
        .await;
    assert_eq!(placed.status, StatusCode::CREATED);

    let cart = app.get("/api/user/cart", Some(&token)).await;
    assert_eq!(cart.body, json!([]));
}

#[tokio::test]
async fn test_order_snapshot_survives_catalog_change() {
    let app = TestApp::new();
    let mut burrito = app.stock("Burrito", 950).await;
    let (token, _) = app.register("Ann", "ann@example.com", "secret1").await;

    app.post(
        "/api/orders",
        Some(&token),
        json!({
            "cart": [{ "productId": burrito.id, "quantity": 2 }],
            "address": address(),
        }),
    )
    .await;

    burrito.name = "Deluxe Burrito".to_string();
    burrito.price = Price::from_cents(1500).unwrap();
    app.store.upsert(&burrito).await.unwrap();

    let mine = app.get("/api/orders/myorders", Some(&token)).await;
    assert_eq!(mine.body[0]["items"][0]["name"], "Burrito");
    assert_eq!(total(&mine.body[0]), Decimal::new(1900, 2));
}

// =============================================================================
// History
// =============================================================================

#[tokio::test]
async fn test_my_orders_newest_first_and_private() {
    let app = TestApp::new();
    let burrito = app.stock("Burrito", 950).await;
    let (ann, _) = app.register("Ann", "ann@example.com", "secret1").await;
    let (bob, _) = app.register("Bob", "bob@example.com", "secret1").await;

    let mut placed = Vec::new();
    for quantity in 1..=3 {
        let response = app
            .post(
                "/api/orders",
                Some(&ann),
                json!({
                    "cart": [{ "productId": burrito.id, "quantity": quantity }],
                    "address": address(),
                }),
            )
            .await;
        placed.push(response.body["_id"].clone());
    }

    let mine = app.get("/api/orders/myorders", Some(&ann)).await;
    let ids: Vec<Value> = mine
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["_id"].clone())
        .collect();
    placed.reverse();
    assert_eq!(ids, placed);

    let theirs = app.get("/api/orders/myorders", Some(&bob)).await;
    assert_eq!(theirs.body, json!([]));
}
