//! Shared error type across iotmetrics crates.

use thiserror::Error;

use crate::instrument::InstrumentKind;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Malformed or semantically invalid submission.
    BadRequest,
    /// Metric name already registered under another instrument kind.
    KindMismatch,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in logs and JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::KindMismatch => "KIND_MISMATCH",
            ClientCode::Internal => "INTERNAL",
        }
    }

    /// HTTP status code the gateway answers with.
    pub fn http_status(self) -> u16 {
        match self {
            ClientCode::BadRequest | ClientCode::KindMismatch => 400,
            ClientCode::Internal => 500,
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("{0}")]
    Validation(String),
    #[error("unsupported instrument type: {0}")]
    UnsupportedInstrument(String),
    #[error("metric {name} is registered as {existing}, cannot record it as {requested}")]
    KindMismatch {
        name: String,
        existing: InstrumentKind,
        requested: InstrumentKind,
    },
    #[error("metric {name} exports as {exported}, which metric {existing} already uses")]
    NameCollision {
        name: String,
        existing: String,
        exported: String,
    },
    #[error("invalid config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl MetricsError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            MetricsError::Validation(_)
            | MetricsError::NameCollision { .. }
            | MetricsError::Config(_) => ClientCode::BadRequest,
            MetricsError::KindMismatch { .. } => ClientCode::KindMismatch,
            // Validation runs first, so an unknown kind here is a bug.
            MetricsError::UnsupportedInstrument(_) | MetricsError::Internal(_) => {
                ClientCode::Internal
            }
        }
    }
}

impl From<std::fmt::Error> for MetricsError {
    fn from(e: std::fmt::Error) -> Self {
        MetricsError::Internal(format!("format failed: {e}"))
    }
}
