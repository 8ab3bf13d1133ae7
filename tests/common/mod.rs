#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use serde_json::Value;
use storefront_api::{
    build_router,
    config::AppConfig,
    db,
    entities::commerce::{CategoryModel, Gender, MediaItem, ProductModel, ProductTag, Variant},
    errors::ServiceError,
    services::{
        commerce::{CreateCategoryInput, CreateProductInput},
        media::MediaHost,
    },
    AppState,
};
use tempfile::TempDir;
use tower::ServiceExt;

/// Media host double that records the asset ids it was asked to delete.
#[derive(Debug, Default)]
pub struct RecordingMediaHost {
    deleted: Mutex<Vec<String>>,
}

impl RecordingMediaHost {
    /// Deleted ids, sorted.
    pub fn deleted(&self) -> Vec<String> {
        let mut ids = self.deleted.lock().expect("recording lock").clone();
        ids.sort();
        ids
    }
}

#[async_trait::async_trait]
impl MediaHost for RecordingMediaHost {
    async fn delete_asset(&self, public_id: &str) -> Result<(), ServiceError> {
        self.deleted
            .lock()
            .expect("recording lock")
            .push(public_id.to_string());
        Ok(())
    }
}

pub const WHATSAPP_NUMBER: &str = "15551234567";

/// Helper harness for spinning up the full router backed by a throwaway SQLite file.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub media: Arc<RecordingMediaHost>,
    _db_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Construct a test application, letting the caller tweak configuration first.
    pub async fn with_config(configure: impl FnOnce(&mut AppConfig)) -> Self {
        let db_dir = tempfile::tempdir().expect("temp dir for test database");
        let db_path = db_dir.path().join("storefront_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "127.0.0.1".to_string(),
            18_080,
            "development".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.whatsapp_number = Some(WHATSAPP_NUMBER.to_string());
        configure(&mut cfg);

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let media = Arc::new(RecordingMediaHost::default());
        let state = AppState::new(pool, cfg, media.clone());
        let router = build_router(state.clone()).expect("router should build");

        Self {
            router,
            state,
            media,
            _db_dir: db_dir,
        }
    }

    /// Send a request and decode the JSON body (Null for empty bodies).
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request");

        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body bytes");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json response")
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }

    pub async fn seed_category(&self, name: &str, gender: Gender) -> CategoryModel {
        self.state
            .services
            .categories
            .create_category(CreateCategoryInput {
                name: name.to_string(),
                image_url: format!("https://cdn.example.com/{}.jpg", name.to_lowercase()),
                gender,
                image_public_id: Some(format!("categories/{}", name.to_lowercase())),
            })
            .await
            .expect("seed category for tests")
    }

    /// Seeds a product offering `sizes` in one variant per color.
    pub async fn seed_product(
        &self,
        name: &str,
        category: &CategoryModel,
        price: Decimal,
        discounted_price: Option<Decimal>,
        sizes: &[&str],
        colors: &[&str],
        tag: Option<ProductTag>,
    ) -> ProductModel {
        let slug = name.to_lowercase().replace(' ', "-");
        let variants = colors
            .iter()
            .map(|color| Variant {
                color: color.to_string(),
                media: vec![MediaItem {
                    url: format!("https://cdn.example.com/{slug}-{color}.jpg"),
                    public_id: format!("products/{slug}-{color}"),
                }],
            })
            .collect();

        self.state
            .services
            .product_catalog
            .create_product(CreateProductInput {
                name: name.to_string(),
                description: format!("{name} seeded for integration tests"),
                price,
                discounted_price,
                category_id: category.id,
                variants,
                sizes: sizes.iter().map(|s| s.to_string()).collect(),
                tag,
            })
            .await
            .expect("seed product for tests")
            .product
    }
}
