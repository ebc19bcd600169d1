//! Shared helpers for router-level tests.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use tower::ServiceExt;

use crate::auth::jwt::JwtKeys;
use crate::config::JwtConfig;
use crate::state::AppState;
use crate::store::{memory::MemoryStore, Store};

pub fn test_keys() -> JwtKeys {
    JwtKeys::new(&JwtConfig {
        secret: "test-secret".into(),
        ttl_days: 7,
    })
}

/// Full router over a fresh in-memory store. The store handle is returned so
/// tests can seed and inspect it.
pub fn test_app() -> (Router, MemoryStore) {
    let store = MemoryStore::default();
    let state = AppState::from_parts(test_keys(), Arc::new(store.clone()) as Arc<dyn Store>);
    (crate::app::build_app(state), store)
}

pub fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("X-Auth-Token", token);
    }
    let body = match body {
        Some(v) => Body::from(serde_json::to_vec(&v).unwrap()),
        None => Body::empty(),
    };
    builder.body(body).unwrap()
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}
