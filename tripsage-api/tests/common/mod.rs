#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

use tripsage_api::llm::FallbackSummaryGenerator;
use tripsage_api::mailer::LogMailer;
use tripsage_api::{app, AppState};
use tripsage_core::token::TokenService;
use tripsage_store::MemoryStore;

pub const TEST_SECRET: &str = "test-secret";

/// A full router over the in-memory store, the logging mailer, and the
/// fallback summary generator. The store handle is returned so tests can
/// seed data behind the HTTP surface.
pub fn test_app() -> (Router, MemoryStore) {
    let store = MemoryStore::new();
    let state = test_state(&store);
    (app(state), store)
}

pub fn test_state(store: &MemoryStore) -> AppState {
    let shared = Arc::new(store.clone());
    AppState {
        users: shared.clone(),
        bookings: shared.clone(),
        summaries: shared,
        tokens: Arc::new(TokenService::new(TEST_SECRET, 3600)),
        mailer: Arc::new(LogMailer),
        generator: Arc::new(FallbackSummaryGenerator),
    }
}

pub async fn request(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Signs up and logs in a user, returning (user_id, session_token).
pub async fn signup_and_login(app: &Router, name: &str, email: &str, password: &str) -> (String, String) {
    let (status, body) = request(
        app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({ "name": name, "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "signup failed: {}", body);
    let user_id = body["user"]["id"].as_str().unwrap().to_string();

    let (status, body) = request(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    let token = body["token"].as_str().unwrap().to_string();

    (user_id, token)
}
