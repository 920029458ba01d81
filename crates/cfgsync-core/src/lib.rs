// # cfgsync-core
//
// Core library for the client-side settings synchronization engine.
//
// ## Architecture Overview
//
// The library keeps an in-memory mirror of a remote settings store:
// - **Backend**: Trait for the remote persistence/compute service
// - **ThemeHost**: Trait for the external theming collaborator
// - **SettingsStore**: The mirror itself, emitting change events to observers
// - **SyncEngine**: Orchestrates load/save/reset/regenerate against the backend
// - **ChangeWatcher**: Observer that re-applies the theme when theme fields change
// - **BackendRegistry**: Plugin-based registry for backend implementations
//
// ## Design Principles
//
// 1. **Confirm, then mutate**: the mirror only changes after the backend acknowledged a write
// 2. **Typed fields, string wire**: every field goes through the `codec` table
// 3. **Derived values are read-only**: `current_week` is computed, never persisted
// 4. **Failures are values**: operations log and return errors, nothing panics
// 5. **Library-first**: the CLI is a thin layer over this crate

pub mod backend;
pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod registry;
pub mod settings;
pub mod store;
pub mod theme;
pub mod traits;
pub mod watcher;
pub mod week;

// Re-export core types for convenience
pub use backend::{FileBackend, MemoryBackend};
pub use codec::{ControlMode, DEFAULT_THEME_COLOR, Field, SettingValue, ThemeMode};
pub use config::{BackendConfig, EngineConfig, SyncConfig};
pub use engine::{SyncEngine, SyncEvent};
pub use error::{Error, Result};
pub use registry::BackendRegistry;
pub use settings::Settings;
pub use store::{AppFlags, AppState, ChangeEvent, ChangeOrigin, SettingsObserver, SettingsStore};
pub use theme::{ThemeApplier, TracingThemeHost};
pub use traits::{Backend, BackendFactory, ThemeHost};
pub use watcher::ChangeWatcher;
pub use week::WeekCalculator;
