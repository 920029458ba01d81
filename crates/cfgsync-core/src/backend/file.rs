// # File Backend
//
// File-based implementation of Backend with crash recovery.
//
// ## Purpose
//
// Persists the settings table across restarts for single-machine setups
// where no remote settings service runs.
//
// ## Crash Recovery
//
// - Atomic writes: Uses write-then-rename for atomicity
// - Corruption detection: Validates JSON on load
// - Automatic backup: Keeps .backup of last known good table
// - Recovery: Falls back to backup if corruption detected
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "settings": {
//     "client_uuid": "0b6f1c1e-1f0e-4e8b-9d0a-6f2f3a1c9b11",
//     "theme_mode": "dark",
//     "semester_start_date": "2024-02-26"
//   }
// }
// ```

use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use super::table::SettingsTable;
use crate::Error;
use crate::traits::{Backend, BatchAck, RegeneratedId, SettingsMap};

/// Settings file format version
const SETTINGS_FILE_VERSION: &str = "1.0";

/// File-based backend with crash recovery
///
/// Every accepted write is flushed to disk before the call returns. Missing
/// defaults are filled in (and persisted) when the file is opened.
///
/// # Example
///
/// ```rust,no_run
/// use cfgsync_core::backend::FileBackend;
/// use cfgsync_core::traits::Backend;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let backend = FileBackend::open("/var/lib/cfgsync/settings.json").await?;
///
///     backend.set_config("show_clock", "false").await?;
///
///     let all = backend.get_all_settings().await?;
///     assert_eq!(all["show_clock"], "false");
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    table: RwLock<SettingsTable>,
    today: Option<NaiveDate>,
}

/// Serializable settings file format
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct SettingsFileFormat {
    version: String,
    settings: SettingsTable,
}

impl FileBackend {
    /// Open or create a settings file
    ///
    /// This will:
    /// 1. Create parent directories if needed
    /// 2. Load the existing file, falling back to the backup if corrupted
    /// 3. Fill in missing defaults and persist them
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    Error::config(format!(
                        "Failed to create settings directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let mut table = Self::load_with_recovery(&path).await?;
        let seeded = table.seed_defaults();

        let backend = Self {
            path,
            table: RwLock::new(table),
            today: None,
        };

        if seeded > 0 {
            tracing::debug!("Seeded {} default settings", seeded);
            backend.persist().await?;
        }

        Ok(backend)
    }

    /// Pin the date used for week calculation
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the table, recovering from the backup when the file is corrupted
    async fn load_with_recovery(path: &Path) -> Result<SettingsTable, Error> {
        match Self::load(path).await {
            Ok(table) => {
                tracing::debug!("Loaded settings file: {} keys", table.len());
                Ok(table)
            }
            Err(Error::Json(e)) => {
                tracing::warn!(
                    "Settings file appears corrupted: {}. Attempting recovery from backup.",
                    e
                );

                let backup_path = Self::backup_path(path);
                if !backup_path.exists() {
                    tracing::warn!("No backup file found. Starting from defaults.");
                    return Ok(SettingsTable::new());
                }

                match Self::load(&backup_path).await {
                    Ok(table) => {
                        tracing::info!("Recovered settings from backup: {} keys", table.len());
                        if let Err(restore_err) = fs::copy(&backup_path, path).await {
                            tracing::error!(
                                "Failed to restore settings file from backup: {}",
                                restore_err
                            );
                        }
                        Ok(table)
                    }
                    Err(backup_err) => {
                        tracing::error!(
                            "Backup also corrupted: {}. Starting from defaults.",
                            backup_err
                        );
                        Ok(SettingsTable::new())
                    }
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn load(path: &Path) -> Result<SettingsTable, Error> {
        if !path.exists() {
            tracing::debug!("Settings file does not exist: {}", path.display());
            return Ok(SettingsTable::new());
        }

        let content = fs::read_to_string(path).await?;
        let file: SettingsFileFormat = serde_json::from_str(&content)?;

        if file.version != SETTINGS_FILE_VERSION {
            tracing::warn!(
                "Settings file version mismatch: expected {}, got {}. Attempting to load anyway.",
                SETTINGS_FILE_VERSION,
                file.version
            );
        }

        Ok(file.settings)
    }

    /// Write the table to disk atomically
    async fn persist(&self) -> Result<(), Error> {
        let table = self.table.read().await;
        self.write_table(&table).await
    }

    async fn write_table(&self, table: &SettingsTable) -> Result<(), Error> {
        let file = SettingsFileFormat {
            version: SETTINGS_FILE_VERSION.to_string(),
            settings: table.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        let temp_path = self.temp_path();
        {
            let mut temp = fs::File::create(&temp_path).await.map_err(|e| {
                Error::transport(
                    "file",
                    format!("Failed to create temp file {}: {}", temp_path.display(), e),
                )
            })?;
            temp.write_all(json.as_bytes()).await?;
            temp.flush().await?;
        }

        if self.path.exists() {
            if let Err(e) = fs::copy(&self.path, Self::backup_path(&self.path)).await {
                tracing::warn!("Failed to create backup: {}", e);
            }
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::transport(
                "file",
                format!(
                    "Failed to rename {} to {}: {}",
                    temp_path.display(),
                    self.path.display(),
                    e
                ),
            )
        })?;

        tracing::trace!("Settings written to file: {}", self.path.display());
        Ok(())
    }

    /// Apply `change` to a copy of the table and swap it in once persisted
    ///
    /// The in-memory table only moves when the write succeeded.
    async fn commit<T>(&self, change: impl FnOnce(&mut SettingsTable) -> T) -> Result<T, Error> {
        let mut table = self.table.write().await;
        let mut next = table.clone();
        let result = change(&mut next);
        self.write_table(&next).await?;
        *table = next;
        Ok(result)
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }
}

#[async_trait]
impl Backend for FileBackend {
    async fn get_all_settings(&self) -> Result<SettingsMap, Error> {
        Ok(self.table.read().await.values().clone())
    }

    async fn set_config(&self, key: &str, value: &str) -> Result<(), Error> {
        self.commit(|table| table.set(key, value)).await
    }

    async fn update_settings(&self, settings: &SettingsMap) -> Result<BatchAck, Error> {
        let mut table = self.table.write().await;
        let mut next = table.clone();
        let ack = next.update(settings);
        if ack.success {
            self.write_table(&next).await?;
            *table = next;
        }
        Ok(ack)
    }

    async fn regenerate_uuid(&self) -> Result<RegeneratedId, Error> {
        let uuid = self.commit(SettingsTable::regenerate_uuid).await?;
        Ok(RegeneratedId {
            success: true,
            uuid,
        })
    }

    async fn reset_settings(&self, exclude: &[String]) -> Result<BatchAck, Error> {
        self.commit(|table| table.reset(exclude)).await?;
        Ok(BatchAck::accepted())
    }

    async fn get_calculated_week_number(&self) -> Result<Option<u32>, Error> {
        let today = self
            .today
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        Ok(Some(self.table.read().await.week_number(today)))
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}
