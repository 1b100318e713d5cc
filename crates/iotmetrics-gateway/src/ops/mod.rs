//! Operational HTTP endpoints.
//!
//! - `/health`       : liveness
//! - `/metrics`      : Prometheus text format
//! - `/metrics/info` : where the exposition lives

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use iotmetrics_core::exposition::{self, DocumentHeader};
use iotmetrics_core::InstrumentKind;

use crate::app_state::{unix_now, AppState};

fn supported_instruments() -> Vec<&'static str> {
    InstrumentKind::ALL.iter().map(|k| k.as_str()).collect()
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "server": state.cfg().server.name,
        "version": env!("CARGO_PKG_VERSION"),
        "supported_instruments": supported_instruments(),
        "timestamp": unix_now(),
    }))
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    // Snapshot first; rendering runs with no registry lock held.
    let snapshot = state.registry().snapshot();
    let cfg = state.cfg();
    let doc_header = DocumentHeader {
        server_name: &cfg.server.name,
        server_addr: &cfg.server.listen,
        generated_at: unix_now(),
    };

    match exposition::render(&snapshot, Some(&doc_header)) {
        Ok(body) => {
            tracing::debug!(bytes = body.len(), metrics = snapshot.len(), "served exposition");
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, exposition::CONTENT_TYPE)],
                body,
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "exposition render failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                format!("Error generating metrics: {e}"),
            )
                .into_response()
        }
    }
}

pub async fn info(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": "Prometheus metrics available at /metrics",
        "metrics_url": format!("http://{}/metrics", state.cfg().server.listen),
        "content_type": exposition::CONTENT_TYPE,
        "opentelemetry_instruments": supported_instruments(),
    }))
}
