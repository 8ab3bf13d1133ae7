//! Header banner endpoints.

mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn header_lifecycle() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/header",
            json!({
                "name": "Summer Sale",
                "description": "Up to 50% off",
                "imageUrl": "https://cdn.example.com/summer.jpg",
                "tag": "sale",
                "imagePublicId": "headers/summer"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["tag"], "sale");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app.get("/api/header").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = app
        .put(
            &format!("/api/header/{id}"),
            json!({
                "imageUrl": "https://cdn.example.com/summer-v2.jpg",
                "imagePublicId": "headers/summer-v2"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Summer Sale");
    assert_eq!(body["data"]["imagePublicId"], "headers/summer-v2");
    assert_eq!(app.media.deleted(), vec!["headers/summer".to_string()]);

    let (status, _) = app.delete(&format!("/api/header/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        app.media.deleted(),
        vec!["headers/summer".to_string(), "headers/summer-v2".to_string()]
    );

    let (_, body) = app.get("/api/header").await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn header_requires_valid_image_url() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post(
            "/api/header",
            json!({ "name": "Broken", "imageUrl": "not a url", "tag": "new" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_header_is_not_found() {
    let app = TestApp::new().await;

    let (status, _) = app.delete(&format!("/api/header/{}", Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .put(&format!("/api/header/{}", Uuid::new_v4()), json!({ "name": "x" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
