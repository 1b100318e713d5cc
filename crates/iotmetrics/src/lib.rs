//! Top-level facade crate for iotmetrics.
//!
//! Re-exports the aggregation core and the HTTP gateway so users can depend on a single crate.

pub mod core {
    pub use iotmetrics_core::*;
}

pub mod gateway {
    pub use iotmetrics_gateway::*;
}
