//! Server config loader (strict parsing).

pub mod schema;

use std::fs;
use std::io::ErrorKind;

use iotmetrics_core::error::{MetricsError, Result};

pub use schema::{AppConfig, MetricsSection, ServerSection};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "IOTMETRICS_CONFIG";
/// Config file used when [`CONFIG_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "iotmetrics.yaml";

pub fn load_from_str(s: &str) -> Result<AppConfig> {
    let cfg: AppConfig = serde_yaml::from_str(s)
        .map_err(|e| MetricsError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load `path`, falling back to defaults when the file does not exist.
pub fn load_or_default(path: &str) -> Result<AppConfig> {
    match fs::read_to_string(path) {
        Ok(s) => load_from_str(&s),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(%path, "config file not found, using defaults");
            Ok(AppConfig::default())
        }
        Err(e) => Err(MetricsError::Config(format!("read config failed ({path}): {e}"))),
    }
}

/// Config path from the environment, or the default file name.
pub fn config_path() -> String {
    std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}
