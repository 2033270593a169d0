//! Common test utilities for API testing with mocks.
//!
//! Builds an in-process router over a `MockCatalogRepository` and an
//! in-memory key-value store, so the HTTP surface can be exercised
//! without a live upstream.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use bestiary_core::{
    testing::MockCatalogRepository, CatalogRecord, CatalogStore, Config, FavoritesPersistence,
    MemoryKeyValueStore, UpstreamConfig,
};
use bestiary_server::{api::create_router, state::AppState};

pub use bestiary_core::testing::fixtures;

/// Key the fixture persists favorites under.
pub const FAVORITES_KEY: &str = "favorites";

/// In-process server with controllable dependencies.
///
/// ```rust,ignore
/// let fixture = TestFixture::with_catalog(fixtures::records(45)).await;
/// let response = fixture.post("/api/v1/refresh", json!({})).await;
/// assert_eq!(response.status, StatusCode::OK);
/// ```
pub struct TestFixture {
    pub router: Router,
    /// Mock repository - configure catalog, search results, delays and errors
    pub repository: Arc<MockCatalogRepository>,
    /// Backing store for persisted favorites
    pub kv: Arc<MemoryKeyValueStore>,
}

#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    pub async fn new() -> Self {
        Self::with_kv(Arc::new(MemoryKeyValueStore::new())).await
    }

    /// Fixture whose repository serves `records`.
    pub async fn with_catalog(records: Vec<CatalogRecord>) -> Self {
        let fixture = Self::new().await;
        fixture.repository.set_catalog(records).await;
        fixture
    }

    /// Fixture over an existing key-value store, so favorites can be pre-seeded.
    pub async fn with_kv(kv: Arc<MemoryKeyValueStore>) -> Self {
        let repository = Arc::new(MockCatalogRepository::new());

        let config = Config {
            upstream: UpstreamConfig::new(fixtures::BASE_URL),
            server: Default::default(),
            fetch: Default::default(),
            favorites: Default::default(),
        };

        let favorites = FavoritesPersistence::new(kv.clone(), FAVORITES_KEY);
        let store = Arc::new(CatalogStore::new(
            repository.clone(),
            favorites,
            config.fetch.page_size,
        ));

        let state = Arc::new(AppState::new(config, store));
        let router = create_router(state);

        Self {
            router,
            repository,
            kv,
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    pub async fn put(&self, path: &str) -> TestResponse {
        self.request("PUT", path, None).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).to_string();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}
