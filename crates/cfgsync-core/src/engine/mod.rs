//! Settings synchronization engine
//!
//! The SyncEngine is responsible for:
//! - Loading the full settings set from the Backend into the SettingsStore
//! - Persisting single and batched writes, mirroring them only once confirmed
//! - Keeping the derived `current_week` fresh
//! - Driving the ThemeHost on load and on theme changes
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   get/set/update/reset   ┌──────────────┐
//! │   Backend   │◄────────────────────────│  SyncEngine  │
//! └─────────────┘                          └──────────────┘
//!                                                  │ confirmed writes
//!                                                  ▼
//!                                         ┌──────────────────┐
//!                                         │  SettingsStore   │
//!                                         └──────────────────┘
//!                                                  │ ChangeEvent
//!                                                  ▼
//! ┌─────────────┐      apply_theme         ┌──────────────────┐
//! │  ThemeHost  │◄─────────────────────────│  ChangeWatcher   │
//! └─────────────┘                          └──────────────────┘
//! ```
//!
//! ## Write Flow
//!
//! 1. Encode typed values into their wire strings
//! 2. Call the Backend
//! 3. On confirmation, write the store (observers notified)
//! 4. Recompute `current_week` if `semester_start_date` was written
//! 5. Emit a [`SyncEvent`] for monitoring/logging
//!
//! `set_theme_mode` is the only optimistic operation: it writes and applies
//! locally before step 2.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, warn};

use crate::codec::{self, Field, SettingValue, ThemeMode};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::store::{ChangeOrigin, SettingsStore};
use crate::theme::ThemeApplier;
use crate::traits::{Backend, RegeneratedId, SettingsMap, ThemeHost};
use crate::watcher::ChangeWatcher;
use crate::week::WeekCalculator;

/// Events emitted by the SyncEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Full load completed
    Loaded {
        /// Number of fields whose value changed
        changed: usize,
        current_week: u32,
    },

    /// Full load failed; the store was left untouched
    LoadFailed { error: String },

    /// Write confirmed by the backend and mirrored locally
    Saved { keys: Vec<String> },

    /// Backend answered the batch with `success: false`
    SaveRejected { keys: Vec<String> },

    /// Backend call failed
    SaveFailed { keys: Vec<String>, error: String },

    /// Derived week refreshed
    WeekRecomputed { week: u32 },

    IdentifierRegenerated { uuid: String },

    IdentifierRegenerationFailed { error: String },

    /// Backend reset confirmed and settings reloaded
    ResetCompleted { excluded: Vec<String> },

    ResetFailed { error: String },

    /// An optimistic local write could not be persisted
    ///
    /// The local value was kept; consumers may revert it.
    OptimisticWriteDiverged {
        field: Field,
        local_value: SettingValue,
        error: String,
    },
}

/// Client-side settings synchronization engine
///
/// ## Lifecycle
///
/// 1. Create with [`SyncEngine::new()`]
/// 2. Call [`SyncEngine::load()`] once the backend is reachable
/// 3. Read through [`SyncEngine::store()`], write through the engine
///
/// ## Threading
///
/// All operations take `&self`; the engine can be shared in an `Arc` and
/// driven from several tasks. Concurrent writes to the same field resolve
/// to the last backend confirmation.
pub struct SyncEngine {
    backend: Arc<dyn Backend>,

    store: Arc<SettingsStore>,

    theme: Arc<ThemeApplier>,

    week: WeekCalculator,

    /// Keys kept by [`SyncEngine::reset_with_default_exclude`]
    default_reset_exclude: Vec<String>,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<SyncEvent>,
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("backend", &self.backend.backend_name())
            .field("store", &self.store)
            .field("theme", &self.theme)
            .finish()
    }
}

impl SyncEngine {
    /// Create a new sync engine
    ///
    /// Subscribes a [`ChangeWatcher`] to `store`, so theme changes written
    /// through this engine reach `theme_host`. A store accepts a single
    /// engine for its whole lifetime; a second `new` on the same store
    /// fails with [`Error::Config`].
    ///
    /// # Parameters
    ///
    /// - `backend`: Backend implementation
    /// - `store`: The settings mirror this engine owns writes to
    /// - `theme_host`: Theme host implementation
    /// - `config`: Engine configuration
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        backend: Arc<dyn Backend>,
        store: Arc<SettingsStore>,
        theme_host: Arc<dyn ThemeHost>,
        config: &EngineConfig,
    ) -> Result<(Self, mpsc::Receiver<SyncEvent>)> {
        config.validate()?;

        if !store.claim() {
            return Err(Error::config(
                "settings store is already driven by another SyncEngine",
            ));
        }

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let theme = Arc::new(ThemeApplier::new(theme_host));
        store.subscribe(Arc::new(ChangeWatcher::new(theme.clone())));

        let engine = Self {
            week: WeekCalculator::new(backend.clone()),
            backend,
            store,
            theme,
            default_reset_exclude: config.default_reset_exclude.clone(),
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// The settings mirror
    pub fn store(&self) -> &Arc<SettingsStore> {
        &self.store
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    /// Fetch every setting from the backend into the store
    ///
    /// Missing keys take their field default. On success the store is
    /// marked loaded, `current_week` is recomputed and the theme is applied
    /// unconditionally. On failure the store is left untouched.
    pub async fn load(&self) -> Result<()> {
        let raw = match self.backend.get_all_settings().await {
            Ok(raw) => raw,
            Err(e) => {
                error!(
                    "Failed to load settings from {}: {}",
                    self.backend.backend_name(),
                    e
                );
                self.emit_event(SyncEvent::LoadFailed {
                    error: e.to_string(),
                });
                return Err(e);
            }
        };

        let values = Field::PERSISTED
            .into_iter()
            .map(|field| (field, codec::decode(field, raw.get(field.key()).map(String::as_str))));
        let changed = self.store.write_many(values, ChangeOrigin::Load);
        self.store.mark_loaded();

        let current_week = self.refresh_week().await;
        self.theme.apply_theme(&self.store.snapshot());

        info!(
            "Loaded settings from {} ({} changed, week {})",
            self.backend.backend_name(),
            changed,
            current_week
        );
        self.emit_event(SyncEvent::Loaded {
            changed,
            current_week,
        });
        Ok(())
    }

    /// Persist one setting
    ///
    /// # Returns
    ///
    /// - `Ok(())`: the backend confirmed and the store was updated
    /// - `Err(Error::DerivedField)`: `key` is `current_week`; no backend call was made
    /// - `Err(Error)`: the backend call failed; the store is unchanged
    ///
    /// Keys outside the mirrored field set are persisted but not mirrored.
    pub async fn save_one(&self, key: &str, value: impl Into<SettingValue>) -> Result<()> {
        let value = value.into();
        let field = Field::from_key(key);

        if field.is_some_and(|f| !f.is_persisted()) {
            warn!("Refusing to save derived field {}", key);
            return Err(Error::derived_field(key));
        }

        let wire = codec::encode(&value);
        if let Err(e) = self.backend.set_config(key, &wire).await {
            error!("Failed to save {} = {}: {}", key, wire, e);
            self.emit_event(SyncEvent::SaveFailed {
                keys: vec![key.to_string()],
                error: e.to_string(),
            });
            return Err(e);
        }

        match field {
            Some(field) => {
                self.store.write(field, &value, ChangeOrigin::Confirmed);
            }
            None => debug!("Saved unmirrored key {}", key),
        }

        debug!("Saved {} = {}", key, wire);
        self.emit_event(SyncEvent::Saved {
            keys: vec![key.to_string()],
        });

        if field == Some(Field::SemesterStartDate) {
            self.refresh_week().await;
        }
        Ok(())
    }

    /// Persist several settings in one backend call
    ///
    /// `current_week` entries are dropped. The store is only updated when
    /// the backend accepts the whole batch; a refused batch yields
    /// `Err(Error::Rejected)` and changes nothing.
    pub async fn save_many<I, K, V>(&self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<SettingValue>,
    {
        let mut values: HashMap<String, SettingValue> = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        if values.remove(Field::CurrentWeek.key()).is_some() {
            debug!("Dropping derived field {} from batch", Field::CurrentWeek);
        }

        let wire: SettingsMap = values
            .iter()
            .map(|(key, value)| (key.clone(), codec::encode(value)))
            .collect();
        let mut keys: Vec<String> = wire.keys().cloned().collect();
        keys.sort();

        let ack = match self.backend.update_settings(&wire).await {
            Ok(ack) => ack,
            Err(e) => {
                error!("Failed to save {} settings: {}", keys.len(), e);
                self.emit_event(SyncEvent::SaveFailed {
                    keys,
                    error: e.to_string(),
                });
                return Err(e);
            }
        };

        if !ack.success {
            warn!(
                "{} refused batch of {} settings",
                self.backend.backend_name(),
                keys.len()
            );
            let err = Error::rejected(
                "update_settings",
                format!("batch of {} settings refused", keys.len()),
            );
            self.emit_event(SyncEvent::SaveRejected { keys });
            return Err(err);
        }

        let recompute = values.contains_key(Field::SemesterStartDate.key());
        let mut typed: Vec<(Field, SettingValue)> = values
            .into_iter()
            .filter_map(|(key, value)| Field::from_key(&key).map(|field| (field, value)))
            .collect();
        // observers get events in field order, not hash order
        typed.sort_by_key(|(field, _)| *field);
        self.store.write_many(typed, ChangeOrigin::Confirmed);

        debug!("Saved {} settings", keys.len());
        self.emit_event(SyncEvent::Saved { keys });

        if recompute {
            self.refresh_week().await;
        }
        Ok(())
    }

    /// Ask the backend for a new client identifier
    ///
    /// Returns the new identifier, or `None` when the backend failed or
    /// refused; the store is only updated on success.
    pub async fn regenerate_identifier(&self) -> Option<String> {
        let error = match self.backend.regenerate_uuid().await {
            Ok(RegeneratedId {
                success: true,
                uuid,
            }) if !uuid.is_empty() => {
                self.store
                    .write(Field::ClientUuid, &uuid.as_str().into(), ChangeOrigin::Confirmed);
                info!("Client identifier regenerated: {}", uuid);
                self.emit_event(SyncEvent::IdentifierRegenerated { uuid: uuid.clone() });
                return Some(uuid);
            }
            Ok(_) => "backend refused to regenerate the identifier".to_string(),
            Err(e) => e.to_string(),
        };

        error!("Failed to regenerate client identifier: {}", error);
        self.emit_event(SyncEvent::IdentifierRegenerationFailed { error });
        None
    }

    /// Reset every backend setting not in `exclude`, then reload
    ///
    /// Defaults are never guessed locally: the store only changes through
    /// the reload that follows a confirmed reset.
    pub async fn reset_to_defaults(&self, exclude: &[String]) -> Result<()> {
        let outcome = match self.backend.reset_settings(exclude).await {
            Ok(ack) if ack.success => Ok(()),
            Ok(_) => Err(Error::rejected("reset_settings", "reset refused")),
            Err(e) => Err(e),
        };

        if let Err(e) = outcome {
            error!("Failed to reset settings: {}", e);
            self.emit_event(SyncEvent::ResetFailed {
                error: e.to_string(),
            });
            return Err(e);
        }

        info!("Settings reset (excluding {:?}), reloading", exclude);
        self.load().await?;

        self.emit_event(SyncEvent::ResetCompleted {
            excluded: exclude.to_vec(),
        });
        Ok(())
    }

    /// Reset using the configured exclude list
    pub async fn reset_with_default_exclude(&self) -> Result<()> {
        let exclude = self.default_reset_exclude.clone();
        self.reset_to_defaults(&exclude).await
    }

    /// Switch the appearance mode optimistically
    ///
    /// The store and the theme host are updated before the backend is
    /// asked. If persisting fails the local value stays, a
    /// [`SyncEvent::OptimisticWriteDiverged`] is emitted and the save error
    /// is returned.
    pub async fn set_theme_mode(&self, mode: ThemeMode) -> Result<()> {
        self.store
            .write(Field::ThemeMode, &mode.into(), ChangeOrigin::Optimistic);
        self.theme.apply_theme(&self.store.snapshot());

        if let Err(e) = self.save_one(Field::ThemeMode.key(), mode).await {
            warn!(
                "Theme mode {} applied locally but not persisted: {}",
                mode, e
            );
            self.emit_event(SyncEvent::OptimisticWriteDiverged {
                field: Field::ThemeMode,
                local_value: mode.into(),
                error: e.to_string(),
            });
            return Err(e);
        }
        Ok(())
    }

    /// Re-apply the current theme to the host
    pub fn apply_theme(&self) {
        self.theme.apply_theme(&self.store.snapshot());
    }

    /// Re-apply the current accent color to the host
    pub fn apply_color_scheme(&self) {
        self.theme.apply_color_scheme(&self.store.snapshot());
    }

    async fn refresh_week(&self) -> u32 {
        let week = self.week.compute().await;
        self.store.set_current_week(week);
        self.emit_event(SyncEvent::WeekRecomputed { week });
        week
    }

    /// Emit an engine event
    fn emit_event(&self, event: SyncEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                warn!(
                    "Event channel full, dropping {:?}. Consider increasing event_channel_capacity.",
                    event
                );
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Event receiver dropped, event discarded");
            }
        }
    }
}
