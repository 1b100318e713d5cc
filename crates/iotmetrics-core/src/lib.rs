//! iotmetrics core: instrument aggregation, label canonicalization and the
//! Prometheus text serializer.
//!
//! This crate carries no transport or runtime dependencies. The gateway
//! validates submissions with [`validate`], folds them into a [`Registry`],
//! and renders registry snapshots with [`exposition::render`].
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Bad submissions surface as `MetricsError` so one request can never take
//! the process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod exposition;
pub mod histogram;
pub mod instrument;
pub mod labels;
pub mod point;
pub mod registry;
pub mod validate;

pub use error::{ClientCode, MetricsError, Result};
pub use instrument::{Aggregator, InstrumentKind};
pub use labels::LabelSet;
pub use point::{AggregatedPoint, HistogramPoint, SumPoint};
pub use registry::{MetricDescriptor, MetricSnapshot, Registry};
pub use validate::{validate, Submission};
