//! Shared helpers for the integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use rover_kernel::config::MissionConfig;
use rover_kernel::dashboard::Dashboard;
use rover_kernel::health::HealthTracker;
use rover_kernel::http::{build_router, AppState};
use rover_kernel::read_model::{ReadModel, SharedReadModel};
use rover_kernel::state::new_state;
use tower::ServiceExt;

pub const SEED: u64 = 2026;

pub fn seeded_config() -> MissionConfig {
    MissionConfig { seed: Some(SEED), ..MissionConfig::default() }
}

/// Starts a seeded engine and wraps it in the HTTP router.
/// Must be called inside a tokio runtime.
pub fn build_test_app() -> (Router, SharedReadModel) {
    let read_model = ReadModel::shared();
    let dashboard = Dashboard::start(&seeded_config(), read_model.clone()).expect("engine starts");
    let state = AppState {
        read_model: read_model.clone(),
        alerts: dashboard.alerts(),
        health: HealthTracker::new(),
        dashboard: new_state(dashboard),
    };
    (build_router(state), read_model)
}

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
