//! iotmetrics gateway library entry.
//!
//! Wires config, shared state, the metric API and operational endpoints into
//! an axum router. Consumed by the binary (`main.rs`) and by integration
//! tests.

pub mod api;
pub mod app_state;
pub mod config;
pub mod ops;
pub mod router;
pub mod transport;
