//! Metric submission and introspection endpoints.
//!
//! - `POST /api/metrics`      : validate and record one measurement
//! - `GET  /api/metrics/list` : per-instrument summary
//! - `GET  /api/status`       : server status and instrument counts

pub mod response;

use axum::{extract::State, Json};
use bytes::Bytes;
use serde_json::{json, Value};

use iotmetrics_core::{validate, MetricsError};

use crate::app_state::{unix_now, AppState};

pub use response::ApiError;

pub async fn submit_metric(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let raw: Value = serde_json::from_slice(&body)
        .map_err(|e| MetricsError::Validation(format!("Invalid JSON: {e}")))?;

    let sub = validate(&raw)?;

    state.registry().record(
        &sub.metric_name,
        sub.instrument_type,
        sub.value,
        &sub.attributes,
        sub.unit.as_deref(),
        sub.description.as_deref(),
    )?;

    tracing::info!(
        metric = %sub.metric_name,
        kind = %sub.instrument_type,
        value = sub.value,
        unit = sub.unit.as_deref().unwrap_or(""),
        labels = sub.attributes.len(),
        "metric recorded"
    );

    let mut resp = response::success_body("OpenTelemetry metric recorded successfully");
    resp["data"] = json!({
        "metric_name": sub.metric_name,
        "instrument_type": sub.instrument_type,
        "value": sub.value,
        "unit": sub.unit.unwrap_or_default(),
        "description": sub.description.unwrap_or_default(),
        "attributes": sub.attributes,
        "timestamp": unix_now(),
    });
    Ok(Json(resp))
}

pub async fn list_metrics(State(state): State<AppState>) -> Json<Value> {
    let instruments = state.registry().list();
    Json(json!({
        "opentelemetry_standard": true,
        "total_instruments": instruments.len(),
        "instruments": instruments,
        "timestamp": unix_now(),
    }))
}

pub async fn status(State(state): State<AppState>) -> Json<Value> {
    let cfg = state.cfg();
    Json(json!({
        "status": "running",
        "server": cfg.server.name,
        "listen": cfg.server.listen,
        "uptime_secs": state.uptime_secs(),
        "histogram_boundaries": state.registry().histogram_boundaries(),
        "registered_instruments": state.registry().stats(),
        "endpoints": {
            "submit_metric": "POST /api/metrics",
            "list_metrics": "GET /api/metrics/list",
            "prometheus_metrics": "GET /metrics",
            "health": "GET /health",
            "status": "GET /api/status",
            "metrics_info": "GET /metrics/info",
        },
        "timestamp": unix_now(),
    }))
}
