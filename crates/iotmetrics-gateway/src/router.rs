//! Axum router wiring.
//!
//! Metric ingestion and introspection live under `/api`, operational
//! endpoints at the root. CORS wraps every route.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{api, app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/metrics", post(api::submit_metric))
        .route("/api/metrics/list", get(api::list_metrics))
        .route("/api/status", get(api::status))
        .route("/health", get(ops::health))
        .route("/metrics", get(ops::metrics))
        .route("/metrics/info", get(ops::info))
        .layer(middleware::from_fn(transport::cors::cors))
        .with_state(state)
}
