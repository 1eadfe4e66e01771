//! Helpers for route tests

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use flow_core::employee::SqliteEmployeeStore;
use flow_core::task::SqliteTaskStore;
use flow_core::{Database, DatabaseConfig};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::auth::TokenIssuer;
use crate::state::AppState;

pub fn build_state(auth_enabled: bool) -> (AppState, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(&DatabaseConfig::new(temp_dir.path().join("flow.db"))).unwrap();
    let state = AppState::with_repositories(
        Arc::new(SqliteEmployeeStore::new(db.clone())),
        Arc::new(SqliteTaskStore::new(db)),
        TokenIssuer::new("test-secret", 3600),
        auth_enabled,
    );
    (state, temp_dir)
}

pub fn build_app(auth_enabled: bool) -> (Router, TempDir) {
    let (state, temp_dir) = build_state(auth_enabled);
    (super::router(state), temp_dir)
}

/// Send a request and decode the JSON body (`Null` when empty)
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let payload = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, payload)
}

pub async fn register(app: &Router, name: &str, email: &str, password: &str) -> Value {
    let (status, payload) = send(
        app,
        "POST",
        "/empregados/registrar",
        None,
        Some(json!({
            "nome": name,
            "cargo": "Dev",
            "email": email,
            "senha": password
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{payload}");
    payload
}

pub async fn login(app: &Router, email: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/token")
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(Body::from(format!("username={}&password={}", email, password)))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let payload: Value = serde_json::from_slice(&bytes).unwrap();
    payload["access_token"].as_str().unwrap().to_string()
}
