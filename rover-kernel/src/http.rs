/**
 * DASHBOARD API - HTTP boundary consumed by the presentation layer
 *
 * ROLE:
 * Read side: `/snapshot` plus narrower views of the read model, all pure
 * copies that are safe to poll at any rate.
 * Write side: operator actions on alerts (ack, monitor, resolve, dismiss) and
 * the alert list filter. Actions are forwarded to the alert manager task.
 *
 * An unknown alert id is not an HTTP error: the response carries the
 * `not_found` outcome with status 200. Only a stopped alert manager maps to 503.
 */

use crate::alerts::{Alert, AlertFilter, AlertOutcome, AlertSummary, SeverityFilter};
use crate::dashboard::{AlertAction, AlertHandle, Dashboard};
use crate::error::DashboardError;
use crate::health::{HealthTracker, KernelHealth};
use crate::metrics::MetricView;
use crate::read_model::{DashboardSnapshot, SharedReadModel};
use crate::state::Shared;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct AppState {
    pub read_model: SharedReadModel,
    pub alerts: AlertHandle,
    pub health: HealthTracker,
    pub dashboard: Shared<Dashboard>,
}

#[derive(Debug, Serialize)]
struct ActionResponse {
    id: String,
    action: AlertAction,
    outcome: AlertOutcome,
}

#[derive(Debug, Deserialize)]
struct FilterUpdate {
    severity: Option<SeverityFilter>,
    show_acknowledged: Option<bool>,
}

fn unavailable(e: DashboardError) -> StatusCode {
    tracing::error!("[http] {}", e);
    StatusCode::SERVICE_UNAVAILABLE
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/system/health", get(get_system_health))
        .route("/snapshot", get(get_snapshot))
        .route("/metrics", get(list_metrics))
        .route("/metrics/{name}", get(get_metric))
        .route("/alerts", get(list_alerts))
        .route("/alerts/summary", get(get_alert_summary))
        .route("/alerts/filter", put(set_alert_filter))
        .route("/alerts/{id}", axum::routing::delete(dismiss_alert))
        .route("/alerts/{id}/ack", post(acknowledge_alert))
        .route("/alerts/{id}/monitor", post(monitor_alert))
        .route("/alerts/{id}/resolve", post(resolve_alert))
        .with_state(app_state)
}

// GET /system/health
async fn get_system_health(State(app): State<AppState>) -> Json<KernelHealth> {
    let running = app.dashboard.lock().running_tasks();
    Json(app.health.get_health(&app.read_model, running))
}

// GET /snapshot
async fn get_snapshot(State(app): State<AppState>) -> Json<DashboardSnapshot> {
    Json(app.read_model.snapshot())
}

// GET /metrics
async fn list_metrics(State(app): State<AppState>) -> Json<Vec<MetricView>> {
    Json(app.read_model.metrics().into_values().collect())
}

// GET /metrics/{name}
async fn get_metric(
    State(app): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MetricView>, StatusCode> {
    app.read_model
        .metric(&name)
        .map(Json)
        .map_err(|_| StatusCode::NOT_FOUND)
}

// GET /alerts (filtered)
async fn list_alerts(State(app): State<AppState>) -> Json<Vec<Alert>> {
    Json(app.read_model.visible_alerts())
}

// GET /alerts/summary
async fn get_alert_summary(State(app): State<AppState>) -> Json<AlertSummary> {
    Json(app.read_model.alert_summary())
}

// PUT /alerts/filter
async fn set_alert_filter(
    State(app): State<AppState>,
    Json(update): Json<FilterUpdate>,
) -> Result<Json<AlertFilter>, StatusCode> {
    let mut filter = app.read_model.alerts().filter;
    if let Some(severity) = update.severity {
        filter = app.alerts.set_severity_filter(severity).await.map_err(unavailable)?;
    }
    if let Some(show) = update.show_acknowledged {
        filter = app.alerts.set_show_acknowledged(show).await.map_err(unavailable)?;
    }
    Ok(Json(filter))
}

async fn run_action(
    app: &AppState,
    action: AlertAction,
    id: String,
) -> Result<Json<ActionResponse>, StatusCode> {
    let outcome = app.alerts.apply(action, &id).await.map_err(unavailable)?;
    Ok(Json(ActionResponse { id, action, outcome }))
}

// POST /alerts/{id}/ack
async fn acknowledge_alert(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, StatusCode> {
    run_action(&app, AlertAction::Acknowledge, id).await
}

// POST /alerts/{id}/monitor
async fn monitor_alert(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, StatusCode> {
    run_action(&app, AlertAction::Monitor, id).await
}

// POST /alerts/{id}/resolve
async fn resolve_alert(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, StatusCode> {
    run_action(&app, AlertAction::Resolve, id).await
}

// DELETE /alerts/{id}
async fn dismiss_alert(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, StatusCode> {
    run_action(&app, AlertAction::Dismiss, id).await
}
