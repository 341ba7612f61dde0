mod common;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use common::{router_with_store, send, TestApp};
use items_service::models::{Item, ItemInput, NearQuery};
use items_service::services::{init_metrics, ItemStore, StoreError};
use serde_json::json;
use std::sync::Arc;

/// Store whose backend is unreachable.
struct DownStore;

fn down() -> StoreError {
    StoreError::Unavailable(anyhow::anyhow!("server selection timeout"))
}

#[async_trait]
impl ItemStore for DownStore {
    async fn create(&self, _item: &ItemInput) -> Result<String, StoreError> {
        Err(down())
    }
    async fn get_all(&self) -> Result<Vec<Item>, StoreError> {
        Err(down())
    }
    async fn get_by_id(&self, _id: &str) -> Result<Item, StoreError> {
        Err(down())
    }
    async fn update(&self, _id: &str, _item: &ItemInput) -> Result<(), StoreError> {
        Err(down())
    }
    async fn delete(&self, _id: &str) -> Result<(), StoreError> {
        Err(down())
    }
    async fn search_near(&self, _query: &NearQuery) -> Result<Vec<Item>, StoreError> {
        Err(down())
    }
    async fn health_check(&self) -> Result<(), StoreError> {
        Err(down())
    }
}

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn();

    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "items-service");
}

#[tokio::test]
async fn health_routes_ignore_api_prefix() {
    let app = TestApp::spawn_with_prefix("/api");

    let (status, _) = send(&app.router, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app.router, Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unhealthy_store_fails_health_and_readiness() {
    let router = router_with_store(Arc::new(DownStore));

    let (status, body) = send(&router, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");

    let (status, _) = send(&router, Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn store_outage_is_a_server_error_with_diagnostics() {
    let router = router_with_store(Arc::new(DownStore));

    let (status, body) = send(&router, Method::GET, "/items/", None, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Database error");
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("server selection timeout"));

    let (status, _) = send(
        &router,
        Method::POST,
        "/items/",
        Some(json!({ "name": "Cafe", "longitude": 0.0, "latitude": 0.0 })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn validation_short_circuits_before_a_down_store() {
    let router = router_with_store(Arc::new(DownStore));

    let (status, _) = send(
        &router,
        Method::POST,
        "/items/",
        Some(json!({ "name": "Cafe", "longitude": 500.0, "latitude": 0.0 })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn responses_carry_request_id_and_security_headers() {
    let app = TestApp::spawn();

    let response = {
        use axum::body::Body;
        use axum::http::Request;
        use tower::util::ServiceExt;

        app.router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/items/")
                    .header("x-request-id", "req-7")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    };

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "req-7");
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
}

#[tokio::test]
async fn metrics_endpoint_exposes_store_and_http_metrics() {
    init_metrics();
    let app = TestApp::spawn();
    app.create_item(json!({ "name": "Cafe", "longitude": -122.42, "latitude": 37.77 }))
        .await;
    app.get("/items/").await;

    let (status, body) = app.get("/metrics").await;

    assert_eq!(status, StatusCode::OK);
    let text = body.as_str().expect("metrics body is plain text");
    assert!(
        text.contains("items_store_operations_total"),
        "store counter missing: {text}"
    );
    assert!(text.contains(r#"operation="create""#), "{text}");
    assert!(text.contains("http_requests_total"), "{text}");
}
