//! Shared application state for the iotmetrics gateway.
//!
//! Built once at startup and cloned into every handler. The registry is the
//! only mutable piece and does its own locking.

use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use iotmetrics_core::error::Result;
use iotmetrics_core::Registry;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    registry: Arc<Registry>,
}

struct AppStateInner {
    cfg: AppConfig,
    started_at: Instant,
}

impl AppState {
    /// Build application state.
    /// Returns Result so main can report a bad boundary list instead of panicking.
    pub fn new(cfg: AppConfig) -> Result<Self> {
        let registry = Registry::new(cfg.metrics.histogram_boundaries.clone())?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                started_at: Instant::now(),
            }),
            registry: Arc::new(registry),
        })
    }

    pub fn cfg(&self) -> &AppConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn uptime_secs(&self) -> u64 {
        self.inner.started_at.elapsed().as_secs()
    }
}

/// Current wall-clock time in Unix seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
