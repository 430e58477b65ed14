use axum::body::Body;
use axum::http::{self, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::http::ApiContext;
use crate::models::memory::MemoryStore;
use crate::models::{DynStore, MockStoreTrait};

pub fn context(store: impl crate::models::StoreTrait + Send + Sync + 'static) -> ApiContext {
    ApiContext {
        store: Arc::new(store) as DynStore,
    }
}

pub fn memory_app(router: Router<ApiContext>, store: &MemoryStore) -> Router {
    router.with_state(context(store.clone()))
}

pub fn mock_app(router: Router<ApiContext>, store: MockStoreTrait) -> Router {
    router.with_state(context(store))
}

/// Send one request and return the status plus the body parsed as JSON
/// (`Value::Null` for an empty body).
pub async fn send(
    app: &Router,
    method: http::Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let body = match body {
        Some(json) => Body::from(json.to_string()),
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
    if body.is_empty() {
        (status, Value::Null)
    } else {
        (status, serde_json::from_slice(&body).unwrap())
    }
}
