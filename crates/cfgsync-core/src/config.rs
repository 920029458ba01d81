//! Configuration types for the settings synchronization engine
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};

use crate::backend::table::CLIENT_UUID_KEY;

/// Main cfgsync configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Backend configuration
    #[serde(default)]
    pub backend: BackendConfig,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl SyncConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.backend.validate()?;
        self.engine.validate()?;
        Ok(())
    }
}

/// Backend configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendConfig {
    /// In-memory backend (not persistent)
    #[default]
    Memory,

    /// JSON file backend
    File {
        /// Path to the settings file
        path: String,
    },

    /// Remote settings service over HTTP
    Http {
        /// Base URL; each call is posted to `{base_url}/{call}`
        base_url: String,
        /// Optional bearer token
        #[serde(default)]
        token: Option<String>,
        /// Request timeout in seconds
        #[serde(default = "default_http_timeout_secs")]
        timeout_secs: u64,
    },

    /// Custom backend
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl BackendConfig {
    /// Validate the backend configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            BackendConfig::Memory => Ok(()),
            BackendConfig::File { path } => {
                if path.trim().is_empty() {
                    return Err(crate::Error::config("File backend path cannot be empty"));
                }
                Ok(())
            }
            BackendConfig::Http {
                base_url,
                timeout_secs,
                ..
            } => {
                if base_url.is_empty() {
                    return Err(crate::Error::config("HTTP backend URL cannot be empty"));
                }
                if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
                    return Err(crate::Error::config(format!(
                        "HTTP backend URL must start with http:// or https://, got {}",
                        base_url
                    )));
                }
                if *timeout_secs == 0 {
                    return Err(crate::Error::config("HTTP backend timeout must be > 0"));
                }
                Ok(())
            }
            BackendConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom backend factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config("Custom backend config cannot be null"));
                }
                Ok(())
            }
        }
    }

    /// Get the backend type name
    pub fn type_name(&self) -> &str {
        match self {
            BackendConfig::Memory => "memory",
            BackendConfig::File { .. } => "file",
            BackendConfig::Http { .. } => "http",
            BackendConfig::Custom { factory, .. } => factory,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Capacity of the engine event channel
    ///
    /// When full, new events are dropped (with a warning log).
    ///
    /// Default: 256 events
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,

    /// Keys preserved by a reset when the caller gives no exclude list
    #[serde(default = "default_reset_exclude")]
    pub default_reset_exclude: Vec<String>,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
            default_reset_exclude: default_reset_exclude(),
        }
    }
}

fn default_event_channel_capacity() -> usize {
    256
}

fn default_reset_exclude() -> Vec<String> {
    vec![CLIENT_UUID_KEY.to_string()]
}

fn default_http_timeout_secs() -> u64 {
    30
}
