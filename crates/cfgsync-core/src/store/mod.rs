// # Settings Store
//
// The client-side mirror of the backend settings.
//
// ## Purpose
//
// Holds one `Settings` record and tells observers which fields changed.
// Only `SyncEngine` mutates it (the mutators are crate-private); every
// other component reads snapshots or subscribes to change events.
//
// ## Notification
//
// Observers run synchronously on the writer's task, after the write lock
// has been released, so they may read the store again. A batch write is
// applied completely before the first observer is called.

pub mod app_state;

pub use app_state::{AppFlags, AppState};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::codec::{Field, SettingValue};
use crate::settings::Settings;

/// Which operation produced a change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// Populated by a full load from the backend
    Load,
    /// Applied after the backend confirmed a write
    Confirmed,
    /// Applied locally ahead of backend confirmation
    Optimistic,
    /// Recomputed derived value
    Derived,
}

/// A single field change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub field: Field,
    pub old_value: SettingValue,
    pub new_value: SettingValue,
    pub origin: ChangeOrigin,
}

/// Receives change events from a [`SettingsStore`]
pub trait SettingsObserver: Send + Sync {
    /// Called once per changed field
    ///
    /// `settings` is a snapshot taken after the whole write was applied.
    fn on_change(&self, settings: &Settings, event: &ChangeEvent);
}

/// The settings mirror
#[derive(Default)]
pub struct SettingsStore {
    state: RwLock<Settings>,
    observers: RwLock<Vec<Arc<dyn SettingsObserver>>>,
    /// Set once a `SyncEngine` has taken over writes
    claimed: AtomicBool,
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("state", &*self.read())
            .field("observers", &self.observer_count())
            .finish()
    }
}

impl SettingsStore {
    /// Create a store holding the pre-load defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current settings
    pub fn snapshot(&self) -> Settings {
        self.read().clone()
    }

    /// Read one field
    pub fn get(&self, field: Field) -> SettingValue {
        self.read().get(field)
    }

    /// Whether a full load has completed
    pub fn is_loaded(&self) -> bool {
        self.read().loaded
    }

    pub fn current_week(&self) -> u32 {
        self.read().current_week
    }

    /// Register an observer for change events
    pub fn subscribe(&self, observer: Arc<dyn SettingsObserver>) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    /// Whether a `SyncEngine` already drives this store
    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }

    /// Reserve the store for one engine; false if it was already taken
    ///
    /// The claim lasts for the store's lifetime: the engine's watcher stays
    /// subscribed even after the engine is dropped.
    pub(crate) fn claim(&self) -> bool {
        !self.claimed.swap(true, Ordering::AcqRel)
    }

    /// Number of registered observers
    pub fn observer_count(&self) -> usize {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Write one field, notifying observers if it changed
    pub(crate) fn write(&self, field: Field, value: &SettingValue, origin: ChangeOrigin) -> bool {
        self.write_many(std::iter::once((field, value.clone())), origin) > 0
    }

    /// Write several fields as one batch
    ///
    /// Returns the number of fields that changed.
    pub(crate) fn write_many<I>(&self, values: I, origin: ChangeOrigin) -> usize
    where
        I: IntoIterator<Item = (Field, SettingValue)>,
    {
        let (events, snapshot) = {
            let mut guard = self.write_guard();
            let mut events = Vec::new();
            for (field, value) in values {
                if let Some(old_value) = guard.set(field, &value) {
                    events.push(ChangeEvent {
                        field,
                        old_value,
                        new_value: guard.get(field),
                        origin,
                    });
                }
            }
            (events, (*guard).clone())
        };

        self.notify(&snapshot, &events);
        events.len()
    }

    /// Mark the first full load as complete
    pub(crate) fn mark_loaded(&self) {
        self.write_guard().loaded = true;
    }

    pub(crate) fn set_current_week(&self, week: u32) -> bool {
        self.write(Field::CurrentWeek, &week.into(), ChangeOrigin::Derived)
    }

    fn notify(&self, snapshot: &Settings, events: &[ChangeEvent]) {
        if events.is_empty() {
            return;
        }

        // Clone the list so observers may subscribe others without deadlocking
        let observers = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for event in events {
            tracing::trace!(
                "{} changed: {} -> {} ({:?})",
                event.field,
                event.old_value,
                event.new_value,
                event.origin
            );
            for observer in &observers {
                observer.on_change(snapshot, event);
            }
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Settings> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, Settings> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
