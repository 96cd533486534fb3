//! # Client Configuration
//!
//! Configuration for the sync client.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                           │
//! │                                                                     │
//! │  1. Environment Variables (highest priority)                        │
//! │     QUILL_SYNC_URL=ws://host:8000/ws                                │
//! │     QUILL_RECONNECT_DELAY_MS=1000                                   │
//! │                                                                     │
//! │  2. TOML Config File                                                │
//! │     ~/.config/quill/sync.toml (Linux)                               │
//! │     ~/Library/Application Support/io.quill.notes/sync.toml (macOS)  │
//! │                                                                     │
//! │  3. Default Values (lowest priority)                                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # sync.toml
//! [endpoint]
//! url = "ws://127.0.0.1:8000/ws"
//!
//! [reconnect]
//! delay_ms = 1000  # fixed delay, retried forever
//!
//! [notification]
//! display_ms = 3000
//! idle_label = "RESULT"
//! idle_color = "inherit"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Endpoint
// =============================================================================

/// The remote store endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// WebSocket URL of the remote note store. Must be reachable at client
    /// startup; there are no authentication fields in the protocol.
    #[serde(default = "default_url")]
    pub url: String,
}

fn default_url() -> String {
    "ws://127.0.0.1:8000/ws".to_string()
}

impl Default for EndpointConfig {
    fn default() -> Self {
        EndpointConfig { url: default_url() }
    }
}

// =============================================================================
// Reconnect Settings
// =============================================================================

/// Reconnection cadence.
///
/// Deliberately a fixed delay with no backoff and no retry cap: the client
/// loops between DISCONNECTED and CONNECTED forever.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectSettings {
    /// Delay between a close and the next connection attempt (ms).
    #[serde(default = "default_reconnect_delay")]
    pub delay_ms: u64,
}

fn default_reconnect_delay() -> u64 {
    1000
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        ReconnectSettings {
            delay_ms: default_reconnect_delay(),
        }
    }
}

// =============================================================================
// Notification Settings
// =============================================================================

/// The transient confirmation slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// How long a confirmation stays on screen (ms).
    #[serde(default = "default_display_ms")]
    pub display_ms: u64,

    /// Label the slot reverts to when idle.
    #[serde(default = "default_idle_label")]
    pub idle_label: String,

    /// Color the slot reverts to when idle.
    #[serde(default = "default_idle_color")]
    pub idle_color: String,
}

fn default_display_ms() -> u64 {
    3000
}

fn default_idle_label() -> String {
    "RESULT".to_string()
}

fn default_idle_color() -> String {
    "inherit".to_string()
}

impl Default for NotificationSettings {
    fn default() -> Self {
        NotificationSettings {
            display_ms: default_display_ms(),
            idle_label: default_idle_label(),
            idle_color: default_idle_color(),
        }
    }
}

// =============================================================================
// Main Client Configuration
// =============================================================================

/// Complete sync client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Remote endpoint.
    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// Reconnection cadence.
    #[serde(default)]
    pub reconnect: ReconnectSettings,

    /// Confirmation slot behavior.
    #[serde(default)]
    pub notification: NotificationSettings,
}

impl ClientConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (sync.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading sync config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load sync config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Sync config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        if !self.endpoint.url.starts_with("ws://") && !self.endpoint.url.starts_with("wss://") {
            return Err(SyncError::InvalidUrl(format!(
                "Endpoint URL must start with ws:// or wss://, got: {}",
                self.endpoint.url
            )));
        }
        url::Url::parse(&self.endpoint.url)?;

        if self.reconnect.delay_ms == 0 {
            return Err(SyncError::InvalidConfig(
                "reconnect.delay_ms must be greater than 0".into(),
            ));
        }
        if self.notification.display_ms == 0 {
            return Err(SyncError::InvalidConfig(
                "notification.display_ms must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Reconnect delay as a [`Duration`].
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect.delay_ms)
    }

    /// Notification display interval as a [`Duration`].
    pub fn notification_display(&self) -> Duration {
        Duration::from_millis(self.notification.display_ms)
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("QUILL_SYNC_URL") {
            debug!(%url, "Overriding endpoint URL from environment");
            self.endpoint.url = url;
        }

        if let Ok(delay) = std::env::var("QUILL_RECONNECT_DELAY_MS") {
            match delay.parse() {
                Ok(ms) => self.reconnect.delay_ms = ms,
                Err(_) => warn!(%delay, "Ignoring invalid QUILL_RECONNECT_DELAY_MS"),
            }
        }
    }

    /// Default config file path under the platform config directory.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("io", "quill", "notes")
            .map(|dirs| dirs.config_dir().join("sync.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.reconnect.delay_ms, 1000);
        assert_eq!(config.notification.display_ms, 3000);
        assert_eq!(config.notification.idle_label, "RESULT");
    }

    #[test]
    fn test_rejects_non_websocket_url() {
        let mut config = ClientConfig::default();
        config.endpoint.url = "http://127.0.0.1:8000".into();
        assert!(matches!(config.validate(), Err(SyncError::InvalidUrl(_))));
    }

    #[test]
    fn test_rejects_zero_delay() {
        let mut config = ClientConfig::default();
        config.reconnect.delay_ms = 0;
        assert!(matches!(config.validate(), Err(SyncError::InvalidConfig(_))));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [endpoint]
            url = "wss://notes.example.com/ws"
            "#,
        )
        .unwrap();
        assert_eq!(config.endpoint.url, "wss://notes.example.com/ws");
        assert_eq!(config.reconnect.delay_ms, 1000);
        assert!(config.validate().is_ok());
    }
}
