// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper.

use api_lib::{adapters::InMemoryStore, config::Config, web::AppState};
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use marketplace_core::ports::MarketplaceStore;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

pub fn memory_store() -> Arc<dyn MarketplaceStore> {
    Arc::new(InMemoryStore::new())
}

pub fn test_state(store: Arc<dyn MarketplaceStore>) -> Arc<AppState> {
    Arc::new(AppState::new(store, Arc::new(Config::default())))
}

pub fn test_app() -> Router {
    setup_tracing();
    api_lib::web::api_router(test_state(memory_store()))
}

/// Sends one request through the router and returns the status with the decoded
/// JSON body (`Value::Null` for empty bodies).
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub async fn send_raw(app: &Router, method: Method, uri: &str, raw_body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(raw_body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}
