// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use exercise_tracker::config::Config;
use exercise_tracker::db::{ExerciseStore, FirestoreDb, InMemoryStore};
use exercise_tracker::routes::create_router;
use exercise_tracker::services::LimitPlacement;
use exercise_tracker::AppState;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

fn app_with_store(store: Arc<dyn ExerciseStore>, placement: LimitPlacement) -> axum::Router {
    let config = Config {
        limit_placement: placement,
        ..Config::test_default()
    };
    create_router(Arc::new(AppState::new(config, store)))
}

/// Create a test app backed by the in-memory store.
/// Returns the router and the store so tests can seed it directly.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<InMemoryStore>) {
    create_test_app_with(LimitPlacement::default())
}

#[allow(dead_code)]
pub fn create_test_app_with(placement: LimitPlacement) -> (axum::Router, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    (app_with_store(store.clone(), placement), store)
}

/// Create a test app whose store is offline; every store call fails.
#[allow(dead_code)]
pub fn create_offline_app() -> axum::Router {
    app_with_store(Arc::new(FirestoreDb::new_mock()), LimitPlacement::default())
}

/// Send a request and decode the JSON body.
#[allow(dead_code)]
pub async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Build a form-encoded POST. Values must already be URL-safe.
#[allow(dead_code)]
pub fn post_form(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    let body = fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}
