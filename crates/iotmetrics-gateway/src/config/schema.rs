use std::net::SocketAddr;

use serde::Deserialize;

use iotmetrics_core::error::{MetricsError, Result};
use iotmetrics_core::histogram::{validate_boundaries, DEFAULT_BOUNDARIES};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub metrics: MetricsSection,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MetricsError::Config(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.server.validate()?;
        self.metrics.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Shown in `/health` and in the exposition header.
    #[serde(default = "default_name")]
    pub name: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            name: default_name(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if self.name.trim().is_empty() {
            return Err(MetricsError::Config("server.name must not be empty".into()));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            MetricsError::Config(format!(
                "server.listen must be a valid SocketAddr ({}): {e}",
                self.listen
            ))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_name() -> String {
    "OpenTelemetry IoT Metrics API".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Fixed for every histogram series created by this process.
    #[serde(default = "default_histogram_boundaries")]
    pub histogram_boundaries: Vec<f64>,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            histogram_boundaries: default_histogram_boundaries(),
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        validate_boundaries(&self.histogram_boundaries).map_err(|e| match e {
            MetricsError::Config(msg) => {
                MetricsError::Config(format!("metrics.histogram_boundaries: {msg}"))
            }
            other => other,
        })
    }
}

fn default_histogram_boundaries() -> Vec<f64> {
    DEFAULT_BOUNDARIES.to_vec()
}
