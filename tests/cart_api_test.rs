//! Cart lifecycle: merging lines, option checks, removal and checkout links.

mod common;

use axum::http::StatusCode;
use common::{TestApp, WHATSAPP_NUMBER};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use storefront_api::entities::commerce::{Gender, ProductModel};
use uuid::Uuid;

async fn seeded_product(app: &TestApp) -> ProductModel {
    let category = app.seed_category("Shirts", Gender::Men).await;
    app.seed_product(
        "Oxford",
        &category,
        dec!(60),
        Some(dec!(50)),
        &["S", "M", "L"],
        &["White", "Blue"],
        None,
    )
    .await
}

fn line<'a>(cart: &'a Value, size: &str) -> &'a Value {
    cart["items"]
        .as_array()
        .expect("cart items")
        .iter()
        .find(|item| item["size"] == size)
        .unwrap_or_else(|| panic!("no line with size {size}"))
}

#[tokio::test]
async fn adding_same_product_and_size_merges_quantities() {
    let app = TestApp::new().await;
    let product = seeded_product(&app).await;

    let (status, body) = app
        .post(
            "/api/cart/create",
            json!({ "userId": "u1", "productId": product.id, "quantity": 2, "size": "M" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["items"][0]["quantity"], 2);
    assert_eq!(body["data"]["size"], "M");

    let (status, body) = app
        .post(
            "/api/cart/create",
            json!({ "userId": "u1", "productId": product.id, "quantity": 1, "size": "M" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 3);
    assert_eq!(items[0]["product"]["name"], "Oxford");
}

#[tokio::test]
async fn merged_quantity_overflow_is_rejected() {
    let app = TestApp::new().await;
    let product = seeded_product(&app).await;

    let (status, _) = app
        .post(
            "/api/cart/create",
            json!({ "userId": "u1", "productId": product.id, "quantity": i32::MAX, "size": "M" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post(
            "/api/cart/create",
            json!({ "userId": "u1", "productId": product.id, "quantity": 1, "size": "M" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("too large"));

    let (status, body) = app
        .post(
            "/api/cart/create",
            json!({ "userId": "u1", "productId": product.id, "quantity": 1, "size": "L" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let cart_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .put(
            "/api/cart/update",
            json!({ "cartId": cart_id, "productId": product.id, "size": "L", "newSize": "M" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.get("/api/cart/u1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(line(&body["data"], "M")["quantity"], i32::MAX);
    assert_eq!(line(&body["data"], "L")["quantity"], 1);
}

#[tokio::test]
async fn different_sizes_are_separate_lines() {
    let app = TestApp::new().await;
    let product = seeded_product(&app).await;

    app.post(
        "/api/cart/create",
        json!({ "userId": "u1", "productId": product.id, "size": "M" }),
    )
    .await;
    let (_, body) = app
        .post(
            "/api/cart/create",
            json!({ "userId": "u1", "productId": product.id, "size": "L", "color": "blue" }),
        )
        .await;

    let cart = &body["data"];
    assert_eq!(cart["items"].as_array().unwrap().len(), 2);
    // quantity defaults to one
    assert_eq!(line(cart, "M")["quantity"], 1);
    assert_eq!(line(cart, "L")["color"], "blue");

    let (status, body) = app.get("/api/cart/u1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["userId"], "u1");
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unavailable_options_are_rejected() {
    let app = TestApp::new().await;
    let product = seeded_product(&app).await;

    let (status, body) = app
        .post(
            "/api/cart/create",
            json!({ "userId": "u1", "productId": product.id, "size": "XXL" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("size XXL"));

    let (status, _) = app
        .post(
            "/api/cart/create",
            json!({ "userId": "u1", "productId": product.id, "size": "M", "color": "Green" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/cart/create",
            json!({ "userId": "u1", "productId": product.id, "size": "M", "quantity": 0 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/cart/create",
            json!({ "userId": "u1", "productId": "oxford", "size": "M" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/cart/create",
            json!({ "userId": "u1", "productId": Uuid::new_v4(), "size": "M" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // nothing was stored
    let (status, _) = app.get("/api/cart/u1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_changes_quantity_and_merges_on_size_change() {
    let app = TestApp::new().await;
    let product = seeded_product(&app).await;

    app.post(
        "/api/cart/create",
        json!({ "userId": "u1", "productId": product.id, "quantity": 2, "size": "M" }),
    )
    .await;
    let (_, body) = app
        .post(
            "/api/cart/create",
            json!({ "userId": "u1", "productId": product.id, "quantity": 1, "size": "L" }),
        )
        .await;
    let cart_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .put(
            "/api/cart/update",
            json!({ "cartId": cart_id, "productId": product.id, "size": "M", "quantity": 4 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(line(&body["data"], "M")["quantity"], 4);

    let (status, body) = app
        .put(
            "/api/cart/update",
            json!({ "cartId": cart_id, "productId": product.id, "size": "M", "newSize": "L" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["size"], "L");
    assert_eq!(items[0]["quantity"], 5);

    let (status, _) = app
        .put(
            "/api/cart/update",
            json!({ "cartId": cart_id, "productId": product.id, "size": "L", "newSize": "XS" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .put(
            "/api/cart/update",
            json!({ "cartId": cart_id, "productId": product.id, "size": "S", "quantity": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn removing_last_line_deletes_cart() {
    let app = TestApp::new().await;
    let product = seeded_product(&app).await;

    app.post(
        "/api/cart/create",
        json!({ "userId": "u1", "productId": product.id, "size": "M" }),
    )
    .await;
    let (_, body) = app
        .post(
            "/api/cart/create",
            json!({ "userId": "u1", "productId": product.id, "size": "L" }),
        )
        .await;
    let cart_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .delete(&format!("/api/cart/delete/{cart_id}/{}?size=M", product.id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cartDeleted"], false);
    assert_eq!(body["data"]["cart"]["items"].as_array().unwrap().len(), 1);

    let (status, body) = app
        .delete(&format!("/api/cart/delete/{cart_id}/{}", product.id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cartDeleted"], true);
    assert!(body["data"].get("cart").is_none());

    let (status, _) = app.get("/api/cart/u1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .delete(&format!("/api/cart/delete/{cart_id}/{}", product.id))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn removing_product_not_in_cart_is_not_found() {
    let app = TestApp::new().await;
    let product = seeded_product(&app).await;

    let (_, body) = app
        .post(
            "/api/cart/create",
            json!({ "userId": "u1", "productId": product.id, "size": "M" }),
        )
        .await;
    let cart_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .delete(&format!("/api/cart/delete/{cart_id}/{}", Uuid::new_v4()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get("/api/cart/u1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn deleted_products_stay_in_cart_without_details() {
    let app = TestApp::new().await;
    let product = seeded_product(&app).await;

    app.post(
        "/api/cart/create",
        json!({ "userId": "u1", "productId": product.id, "size": "M" }),
    )
    .await;
    let (status, _) = app
        .delete(&format!("/api/product/delete/{}", product.id))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get("/api/cart/u1").await;
    assert_eq!(status, StatusCode::OK);
    let item = &body["data"]["items"][0];
    assert_eq!(item["productId"], product.id.to_string());
    assert!(item["product"].is_null());
}

#[tokio::test]
async fn checkout_link_carries_order_summary() {
    let app = TestApp::new().await;
    let product = seeded_product(&app).await;

    app.post(
        "/api/cart/create",
        json!({ "userId": "u1", "productId": product.id, "quantity": 2, "size": "M", "color": "White" }),
    )
    .await;

    let (status, body) = app.get("/api/cart/u1/checkout-link").await;
    assert_eq!(status, StatusCode::OK);
    let link = url::Url::parse(body["data"]["url"].as_str().unwrap()).expect("valid url");
    assert_eq!(link.host_str(), Some("wa.me"));
    assert_eq!(link.path(), format!("/{WHATSAPP_NUMBER}"));

    let text = link
        .query_pairs()
        .find(|(key, _)| key == "text")
        .map(|(_, value)| value.into_owned())
        .expect("text parameter");
    assert!(text.contains("Oxford (size M, color White) x2"));
    assert!(text.contains("Total: 100"));

    let (status, _) = app.get("/api/cart/nobody/checkout-link").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn checkout_link_requires_configured_number() {
    let app = TestApp::with_config(|cfg| cfg.whatsapp_number = None).await;
    let product = seeded_product(&app).await;

    app.post(
        "/api/cart/create",
        json!({ "userId": "u1", "productId": product.id, "size": "M" }),
    )
    .await;

    let (status, _) = app.get("/api/cart/u1/checkout-link").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
