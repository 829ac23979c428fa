//! Configuration file loading and parsing.
//!
//! CloudBoard reads `config.toml` from the data directory. If no config file
//! exists, every setting falls back to its default.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
pub const DEFAULT_ORDER_STEP: i64 = 100;
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5000;

/// Root configuration structure loaded from `config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloudBoardConfig {
    /// HTTP server settings (optional).
    pub server: Option<ServerConfig>,
    /// Backlog ordering settings (optional).
    pub backlog: Option<BacklogConfig>,
    /// Storage backend settings (optional).
    pub storage: Option<StorageConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on (default: 127.0.0.1:5000).
    pub bind: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BacklogConfig {
    /// Gap between consecutive backlog orders (default: 100).
    pub order_step: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// How long to wait for the data directory lock (default: 5000).
    pub lock_timeout_ms: Option<u64>,
}

impl CloudBoardConfig {
    /// Load configuration from `<data_dir>/config.toml` if it exists.
    ///
    /// Returns the default config if the file doesn't exist.
    /// Returns an error if the file exists but is malformed.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join("config.toml");

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(&config_path).context("Failed to read config.toml")?;

        let config: CloudBoardConfig =
            toml::from_str(&content).context("Failed to parse config.toml")?;

        if config.order_step() <= 0 {
            anyhow::bail!("backlog.order_step must be positive");
        }

        Ok(config)
    }

    pub fn bind(&self) -> String {
        self.server
            .as_ref()
            .and_then(|s| s.bind.clone())
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
    }

    pub fn order_step(&self) -> i64 {
        self.backlog
            .as_ref()
            .and_then(|b| b.order_step)
            .unwrap_or(DEFAULT_ORDER_STEP)
    }

    pub fn lock_timeout(&self) -> Duration {
        let ms = self
            .storage
            .as_ref()
            .and_then(|s| s.lock_timeout_ms)
            .unwrap_or(DEFAULT_LOCK_TIMEOUT_MS);
        Duration::from_millis(ms)
    }
}
