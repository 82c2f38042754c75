//! Client configuration.
//!
//! Every field has a default, so an empty TOML file is a valid config.

use papercricket_core::FirstSnapshotPolicy;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base WebSocket address, e.g. `ws://127.0.0.1:8000`.
    pub server_url: String,
    /// Base address of the REST API.
    pub api_url: String,
    /// How long a ball outcome stays on screen.
    pub overlay_duration_ms: u64,
    /// Whether the first snapshot after connecting may announce a ball.
    pub first_snapshot: FirstSnapshotPolicy,
    /// Number of history lines shown in log views.
    pub history_view_limit: usize,
    /// Number of server info lines kept.
    pub info_log_limit: usize,
    /// Capacity of the connection event channel.
    pub event_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "ws://127.0.0.1:8000".to_string(),
            api_url: "http://127.0.0.1:8000/api/game".to_string(),
            overlay_duration_ms: 2000,
            first_snapshot: FirstSnapshotPolicy::Suppress,
            history_view_limit: 60,
            info_log_limit: papercricket_core::state::DEFAULT_INFO_LOG_LIMIT,
            event_capacity: 64,
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn overlay_duration(&self) -> Duration {
        Duration::from_millis(self.overlay_duration_ms)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
