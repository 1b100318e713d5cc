//! iotmetrics gateway
//!
//! - `POST /api/metrics` ingests OpenTelemetry-style measurements
//! - `GET /metrics` serves the aggregated state as Prometheus text
//! - Config from `$IOTMETRICS_CONFIG` or `iotmetrics.yaml` (defaults if absent)

use tracing_subscriber::{fmt, EnvFilter};

use iotmetrics_core::error::{MetricsError, Result};
use iotmetrics_gateway::{app_state, config, router};

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "iotmetrics-gateway failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = config::config_path();
    let cfg = config::load_or_default(&path)?;
    let listen = cfg.server.listen_addr()?;

    let state = app_state::AppState::new(cfg)?;
    let app = router::build_router(state);

    tracing::info!(%listen, "iotmetrics-gateway starting");
    tracing::info!(
        submit = "POST /api/metrics",
        scrape = "GET /metrics",
        list = "GET /api/metrics/list",
        "endpoints"
    );

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| MetricsError::Internal(format!("failed to bind {listen}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| MetricsError::Internal(format!("server failed: {e}")))?;

    tracing::info!("iotmetrics-gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
