#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use items_service::config::{AuthConfig, HttpConfig, ItemsConfig, MongoConfig};
use items_service::services::{
    AuthGate, ItemStore, JwtAuthGate, MemoryItemStore, OpenAuthGate,
};
use items_service::{build_router, AppState};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use secrecy::Secret;
use serde_json::Value;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use tower::util::ServiceExt;

pub const TEST_JWT_SECRET: &str = "items-test-secret";

pub fn test_config(prefix: &str) -> ItemsConfig {
    ItemsConfig {
        common: CoreConfig {
            port: 0,
            ..CoreConfig::default()
        },
        mongodb: MongoConfig {
            uri: Secret::new("mongodb://localhost:27017".to_string()),
            database: "items_test".to_string(),
            timeout_secs: 5,
        },
        auth: AuthConfig { jwt_secret: None },
        http: HttpConfig {
            api_prefix: prefix.to_string(),
            request_timeout_secs: 10,
        },
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryItemStore>,
    pub prefix: String,
}

impl TestApp {
    /// App over an empty in-memory store with an open auth gate.
    pub fn spawn() -> Self {
        Self::build("", Arc::new(OpenAuthGate))
    }

    /// App that requires HS256 bearer tokens signed with [`TEST_JWT_SECRET`].
    pub fn spawn_with_auth() -> Self {
        let gate = JwtAuthGate::new(&Secret::new(TEST_JWT_SECRET.to_string()));
        Self::build("", Arc::new(gate))
    }

    pub fn spawn_with_prefix(prefix: &str) -> Self {
        Self::build(prefix, Arc::new(OpenAuthGate))
    }

    fn build(prefix: &str, auth: Arc<dyn AuthGate>) -> Self {
        let store = Arc::new(MemoryItemStore::new());
        let state = AppState::new(test_config(prefix), store.clone(), auth);
        Self {
            router: build_router(state),
            store,
            prefix: prefix.to_string(),
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        send(&self.router, method, &format!("{}{}", self.prefix, uri), body, token).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body), None).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(body), None).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None, None).await
    }

    /// Create an item and return its id.
    pub async fn create_item(&self, body: Value) -> String {
        let (status, created) = self.post("/items/", body).await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {created}");
        created["id"].as_str().expect("id missing").to_string()
    }
}

/// Router over an arbitrary store, for failure-path tests.
pub fn router_with_store(store: Arc<dyn ItemStore>) -> Router {
    router_with_config(test_config(""), store)
}

pub fn router_with_config(config: ItemsConfig, store: Arc<dyn ItemStore>) -> Router {
    build_router(AppState::new(config, store, Arc::new(OpenAuthGate)))
}

pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    (status, value)
}

pub fn issue_token(secret: &str, sub: &str) -> String {
    #[derive(serde::Serialize)]
    struct Claims<'a> {
        sub: &'a str,
        exp: i64,
    }

    encode(
        &Header::new(Algorithm::HS256),
        &Claims {
            sub,
            exp: 4_102_444_800,
        },
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}
