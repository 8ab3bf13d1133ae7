//! Category endpoints: CRUD, gender filtering and image cleanup.

mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;
use storefront_api::entities::commerce::Gender;

#[tokio::test]
async fn create_then_fetch_category() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/categorie/create",
            json!({
                "name": "Shirts",
                "imageUrl": "https://cdn.example.com/shirts.jpg",
                "gender": "men",
                "imagePublicId": "categories/shirts"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Shirts");
    assert_eq!(body["data"]["gender"], "men");

    let id = body["data"]["id"].as_str().unwrap().to_string();
    let (status, body) = app.get(&format!("/api/categorie/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["imagePublicId"], "categories/shirts");
}

#[tokio::test]
async fn create_rejects_unknown_gender() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post(
            "/api/categorie/create",
            json!({
                "name": "Kids",
                "imageUrl": "https://cdn.example.com/kids.jpg",
                "gender": "kids"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_filters_by_gender() {
    let app = TestApp::new().await;
    app.seed_category("Shirts", Gender::Men).await;
    app.seed_category("Dresses", Gender::Women).await;
    app.seed_category("Skirts", Gender::Women).await;

    let (status, body) = app.get("/api/categorie").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let (status, body) = app.get("/api/categorie?gender=women").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Dresses"));
    assert!(names.contains(&"Skirts"));

    let (status, body) = app.get("/api/categorie?gender=unisex").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");
}

#[tokio::test]
async fn update_replaces_image_and_deletes_old_asset() {
    let app = TestApp::new().await;
    let category = app.seed_category("Shirts", Gender::Men).await;

    let (status, body) = app
        .put(
            &format!("/api/categorie/update/{}", category.id),
            json!({
                "name": "Shirts & Polos",
                "imageUrl": "https://cdn.example.com/polos.jpg",
                "imagePublicId": "categories/polos"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Shirts & Polos");
    assert_eq!(body["data"]["gender"], "men");
    assert_eq!(app.media.deleted(), vec!["categories/shirts".to_string()]);
}

#[tokio::test]
async fn delete_removes_category_and_image() {
    let app = TestApp::new().await;
    let category = app.seed_category("Shirts", Gender::Men).await;

    let (status, _) = app
        .delete(&format!("/api/categorie/delete/{}", category.id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.media.deleted(), vec!["categories/shirts".to_string()]);

    let (status, body) = app.get(&format!("/api/categorie/{}", category.id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
}

#[tokio::test]
async fn malformed_id_is_a_bad_request() {
    let app = TestApp::new().await;

    let (status, _) = app.get("/api/categorie/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.delete("/api/categorie/delete/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
