/**
 * ROVER KERNEL - Main entry point of the mission dashboard backend
 *
 * ROLE: Boot sequence. Loads the mission config, starts the simulation engine,
 * the optional MQTT snapshot publisher and the HTTP API.
 *
 * All periodic tasks run on a single-threaded runtime, so component updates
 * never interleave.
 */

use anyhow::Context;
use rover_kernel::config::{config_path_from_env, load_config};
use rover_kernel::dashboard::Dashboard;
use rover_kernel::health::{spawn_snapshot_publisher, HealthTracker};
use rover_kernel::http::{build_router, AppState};
use rover_kernel::read_model::ReadModel;
use rover_kernel::state::new_state;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rover_kernel=info")),
        )
        .init();

    let path = config_path_from_env();
    let config = load_config(&path)
        .await
        .with_context(|| format!("loading mission config from {}", path.display()))?;

    let read_model = ReadModel::shared();
    let health = HealthTracker::new();

    let dashboard = Dashboard::start(&config, read_model.clone()).context("starting simulation")?;
    let alerts = dashboard.alerts();
    tracing::info!(
        "[kernel] session {} started with {} tasks",
        read_model.session_id(),
        dashboard.running_tasks()
    );
    let dashboard = new_state(dashboard);

    // optional MQTT snapshot stream
    let _publisher = config
        .mqtt
        .clone()
        .map(|conf| spawn_snapshot_publisher(conf, read_model.clone(), health.clone()));

    let app_state = AppState {
        read_model,
        alerts,
        health,
        dashboard: dashboard.clone(),
    };
    let app = build_router(app_state);

    let addr = config.http.bind;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("[kernel] listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("[kernel] failed to listen for ctrl-c: {}", e);
            }
        })
        .await
        .context("serving HTTP")?;

    dashboard.lock().stop();
    tracing::info!("[kernel] simulation stopped");
    Ok(())
}
