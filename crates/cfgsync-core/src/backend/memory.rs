// # Memory Backend
//
// In-memory implementation of Backend.
//
// ## Purpose
//
// Runs the engine without a remote service: tests, demos, and headless
// tools that only need the settings for the lifetime of the process.
//
// ## Crash Behavior
//
// - All settings are lost on restart
// - A fresh `client_uuid` is minted on every start

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::table::SettingsTable;
use crate::Error;
use crate::traits::{Backend, BatchAck, RegeneratedId, SettingsMap};

/// In-memory backend implementation
///
/// # Example
///
/// ```rust,no_run
/// use cfgsync_core::backend::MemoryBackend;
/// use cfgsync_core::traits::Backend;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let backend = MemoryBackend::new();
///
///     backend.set_config("theme_mode", "dark").await?;
///
///     let all = backend.get_all_settings().await?;
///     assert_eq!(all["theme_mode"], "dark");
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    inner: Arc<RwLock<SettingsTable>>,
    today: Option<NaiveDate>,
}

impl MemoryBackend {
    /// Create a backend seeded with defaults
    pub fn new() -> Self {
        Self::from_table(SettingsTable::with_defaults())
    }

    /// Create a backend with no stored settings at all
    pub fn empty() -> Self {
        Self::from_table(SettingsTable::new())
    }

    pub fn from_table(table: SettingsTable) -> Self {
        Self {
            inner: Arc::new(RwLock::new(table)),
            today: None,
        }
    }

    /// Pin the date used for week calculation
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Number of stored keys
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Read one stored value
    pub async fn get(&self, key: &str) -> Option<String> {
        self.inner.read().await.get(key).map(str::to_string)
    }

    fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn get_all_settings(&self) -> Result<SettingsMap, Error> {
        Ok(self.inner.read().await.values().clone())
    }

    async fn set_config(&self, key: &str, value: &str) -> Result<(), Error> {
        self.inner.write().await.set(key, value);
        Ok(())
    }

    async fn update_settings(&self, settings: &SettingsMap) -> Result<BatchAck, Error> {
        Ok(self.inner.write().await.update(settings))
    }

    async fn regenerate_uuid(&self) -> Result<RegeneratedId, Error> {
        let uuid = self.inner.write().await.regenerate_uuid();
        Ok(RegeneratedId {
            success: true,
            uuid,
        })
    }

    async fn reset_settings(&self, exclude: &[String]) -> Result<BatchAck, Error> {
        self.inner.write().await.reset(exclude);
        Ok(BatchAck::accepted())
    }

    async fn get_calculated_week_number(&self) -> Result<Option<u32>, Error> {
        Ok(Some(self.inner.read().await.week_number(self.today())))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
