//! Environment configuration for cfgsyncctl

use anyhow::{Context, Result};
use cfgsync_core::{BackendConfig, EngineConfig, SyncConfig};
use std::env;
use tracing::Level;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backend_type: String,
    pub file_path: Option<String>,
    pub http_url: Option<String>,
    pub http_token: Option<String>,
    pub http_timeout_secs: Option<u64>,
    pub event_capacity: Option<usize>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            backend_type: lookup("CFGSYNC_BACKEND_TYPE").unwrap_or_else(|| "memory".to_string()),
            file_path: lookup("CFGSYNC_FILE_PATH"),
            http_url: lookup("CFGSYNC_HTTP_URL"),
            http_token: lookup("CFGSYNC_HTTP_TOKEN").filter(|t| !t.is_empty()),
            http_timeout_secs: lookup("CFGSYNC_HTTP_TIMEOUT_SECS")
                .map(|s| s.trim().parse())
                .transpose()
                .context("CFGSYNC_HTTP_TIMEOUT_SECS must be a whole number of seconds")?,
            event_capacity: lookup("CFGSYNC_EVENT_CAPACITY")
                .map(|s| s.trim().parse())
                .transpose()
                .context("CFGSYNC_EVENT_CAPACITY must be a positive integer")?,
            log_level: lookup("CFGSYNC_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        match self.backend_type.as_str() {
            "memory" => {}
            "file" => {
                if self.file_path.as_ref().is_none_or(|p| p.trim().is_empty()) {
                    anyhow::bail!(
                        "CFGSYNC_FILE_PATH is required when CFGSYNC_BACKEND_TYPE=file. \
                        Set it via: export CFGSYNC_FILE_PATH=/var/lib/cfgsync/settings.json"
                    );
                }
            }
            "http" => {
                let Some(url) = self.http_url.as_deref().filter(|u| !u.is_empty()) else {
                    anyhow::bail!("CFGSYNC_HTTP_URL is required when CFGSYNC_BACKEND_TYPE=http");
                };

                if !url.starts_with("https://") && !url.starts_with("http://") {
                    anyhow::bail!("CFGSYNC_HTTP_URL must use HTTP or HTTPS scheme. Got: {}", url);
                }

                if url.starts_with("http://") && self.http_token.is_some() {
                    eprintln!(
                        "WARNING: CFGSYNC_HTTP_TOKEN is sent over plain HTTP. Consider using HTTPS."
                    );
                }
            }
            other => anyhow::bail!(
                "CFGSYNC_BACKEND_TYPE '{}' is not supported. \
                Supported types: memory, file, http",
                other
            ),
        }

        if let Some(timeout) = self.http_timeout_secs
            && !(1..=300).contains(&timeout)
        {
            anyhow::bail!(
                "CFGSYNC_HTTP_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                timeout
            );
        }

        if let Some(capacity) = self.event_capacity
            && !(1..=65_536).contains(&capacity)
        {
            anyhow::bail!(
                "CFGSYNC_EVENT_CAPACITY must be between 1 and 65536. Got: {}",
                capacity
            );
        }

        self.log_level()?;
        Ok(())
    }

    /// Parsed log level
    pub fn log_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "CFGSYNC_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }

    /// Build the library configuration
    pub fn to_sync_config(&self) -> Result<SyncConfig> {
        let backend = match self.backend_type.as_str() {
            "file" => BackendConfig::File {
                path: self.file_path.clone().unwrap_or_default(),
            },
            "http" => BackendConfig::Http {
                base_url: self.http_url.clone().unwrap_or_default(),
                token: self.http_token.clone(),
                timeout_secs: self.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
            },
            _ => BackendConfig::Memory,
        };

        let mut engine = EngineConfig::default();
        if let Some(capacity) = self.event_capacity {
            engine.event_channel_capacity = capacity;
        }

        let config = SyncConfig { backend, engine };
        config.validate()?;
        Ok(config)
    }
}
