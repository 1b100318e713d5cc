//! JSON response envelopes shared by the API handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use iotmetrics_core::{ClientCode, MetricsError};

use crate::app_state::unix_now;

/// Core error carried out of a handler.
#[derive(Debug)]
pub struct ApiError(pub MetricsError);

impl From<MetricsError> for ApiError {
    fn from(e: MetricsError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let status =
            StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let error = match code {
            ClientCode::Internal => {
                tracing::error!(error = %self.0, code = code.as_str(), "request failed");
                format!("Internal server error: {}", self.0)
            }
            _ => {
                tracing::warn!(error = %self.0, code = code.as_str(), "request rejected");
                self.0.to_string()
            }
        };

        (status, Json(error_body(&error, status.as_u16()))).into_response()
    }
}

pub fn error_body(error: &str, code: u16) -> Value {
    json!({
        "success": false,
        "error": error,
        "code": code,
        "timestamp": unix_now(),
    })
}

pub fn success_body(message: &str) -> Value {
    json!({
        "success": true,
        "message": message,
        "timestamp": unix_now(),
    })
}
