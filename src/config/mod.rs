//! Configuration module for clusterview
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`CLUSTERVIEW_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use clusterview::config::ClusterviewConfig;
//!
//! let config = ClusterviewConfig::default();
//! assert_eq!(config.gateway.url, "http://localhost:8000");
//!
//! let toml = r#"
//! [gateway]
//! url = "http://10.0.0.5:8000"
//! "#;
//! let config: ClusterviewConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.gateway.url, "http://10.0.0.5:8000");
//! assert_eq!(config.subscription.reconnect_delay_ms, 5000);
//! ```

pub mod error;
pub mod gateway;
pub mod logging;
pub mod subscription;

pub use error::ConfigError;
pub use gateway::GatewayConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use subscription::SubscriptionConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unified configuration for clusterview.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ClusterviewConfig {
    /// Cluster gateway endpoint
    pub gateway: GatewayConfig,
    /// Workload subscription behaviour
    pub subscription: SubscriptionConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl ClusterviewConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(Some(path))
        } else {
            Ok(Self::default())
        }
    }

    /// Apply environment variable overrides
    ///
    /// Invalid values are silently ignored (previous values are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("CLUSTERVIEW_GATEWAY_URL") {
            if !url.is_empty() {
                self.gateway.url = url;
            }
        }

        if let Ok(delay) = std::env::var("CLUSTERVIEW_RECONNECT_DELAY_MS") {
            if let Ok(d) = delay.parse() {
                self.subscription.reconnect_delay_ms = d;
            }
        }

        if let Ok(level) = std::env::var("CLUSTERVIEW_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("CLUSTERVIEW_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gateway.url.is_empty() {
            return Err(ConfigError::invalid("gateway.url", "URL cannot be empty"));
        }
        let parsed = url::Url::parse(&self.gateway.url)
            .map_err(|e| ConfigError::invalid("gateway.url", e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                "gateway.url",
                format!("unsupported scheme '{}', expected http or https", parsed.scheme()),
            ));
        }
        self.gateway
            .websocket_url()
            .map_err(|e| ConfigError::invalid("gateway.websocket_path", e.to_string()))?;

        if self.gateway.request_timeout_seconds == 0 {
            return Err(ConfigError::invalid(
                "gateway.request_timeout_seconds",
                "timeout must be non-zero",
            ));
        }
        if self.subscription.reconnect_delay_ms == 0 {
            return Err(ConfigError::invalid(
                "subscription.reconnect_delay_ms",
                "reconnect delay must be non-zero",
            ));
        }
        if self.subscription.command_timeout_seconds == 0 {
            return Err(ConfigError::invalid(
                "subscription.command_timeout_seconds",
                "timeout must be non-zero",
            ));
        }

        Ok(())
    }
}
