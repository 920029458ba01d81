// # Backend Trait
//
// Defines the interface of the remote settings service.
//
// ## Implementations
//
// - In-memory: `cfgsync_core::backend::MemoryBackend`
// - JSON file: `cfgsync_core::backend::FileBackend`
// - HTTP: `cfgsync-backend-http` crate
//
// ## Usage
//
// ```rust,ignore
// use cfgsync_core::Backend;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let backend = /* Backend implementation */;
//
//     let all = backend.get_all_settings().await?;
//     backend.set_config("theme_mode", "dark").await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::BackendConfig;

/// Wire form of the settings: every key and value is a string
pub type SettingsMap = HashMap<String, String>;

/// Acknowledgement of a batch operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchAck {
    /// Whether the whole batch was applied
    pub success: bool,
}

impl BatchAck {
    pub fn accepted() -> Self {
        Self { success: true }
    }

    pub fn refused() -> Self {
        Self { success: false }
    }
}

/// Answer to an identifier regeneration request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegeneratedId {
    pub success: bool,
    /// The freshly minted identifier (empty when `success` is false)
    #[serde(default)]
    pub uuid: String,
}

/// Trait for backend implementations
///
/// One method per remote call. Implementations are single-shot: they
/// perform exactly one request per invocation and report the outcome.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// ## Responsibilities
/// - ✅ Persist and return settings in their string wire form
/// - ✅ Compute the current week from the stored semester start date
/// - ❌ Retry failed requests (callers decide whether to retry)
/// - ❌ Touch the client mirror (owned by `SyncEngine`)
/// - ❌ Apply themes (owned by `ThemeApplier`)
#[async_trait]
pub trait Backend: Send + Sync {
    /// Fetch every stored setting
    ///
    /// Keys missing from the result imply the field default.
    async fn get_all_settings(&self) -> Result<SettingsMap, crate::Error>;

    /// Persist a single key/value pair
    async fn set_config(&self, key: &str, value: &str) -> Result<(), crate::Error>;

    /// Persist several pairs at once
    ///
    /// # Returns
    ///
    /// - `Ok(BatchAck { success: true })`: every pair was written
    /// - `Ok(BatchAck { success: false })`: the batch was refused as a whole
    /// - `Err(Error)`: the request failed
    async fn update_settings(&self, settings: &SettingsMap) -> Result<BatchAck, crate::Error>;

    /// Mint and store a new client identifier
    async fn regenerate_uuid(&self) -> Result<RegeneratedId, crate::Error>;

    /// Restore defaults for every key not listed in `exclude`
    async fn reset_settings(&self, exclude: &[String]) -> Result<BatchAck, crate::Error>;

    /// Current teaching week derived from the stored semester start date
    ///
    /// `Ok(None)` means the backend had no answer.
    async fn get_calculated_week_number(&self) -> Result<Option<u32>, crate::Error>;

    /// Get the backend name (for logging/debugging)
    fn backend_name(&self) -> &'static str;
}

/// Helper trait for constructing backends from configuration
#[async_trait]
pub trait BackendFactory: Send + Sync {
    /// Create a Backend instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration selecting and parameterizing the backend
    ///
    /// # Returns
    ///
    /// A shared Backend trait object
    async fn create(&self, config: &BackendConfig) -> Result<Arc<dyn Backend>, crate::Error>;
}
