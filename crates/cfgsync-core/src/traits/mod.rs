//! Core traits for cfgsync
//!
//! This module defines the abstract interfaces of the engine's collaborators.
//!
//! - [`Backend`]: The remote settings store and week calculator
//! - [`ThemeHost`]: The theming library that renders mode and accent color

pub mod backend;
pub mod theme_host;

pub use backend::{Backend, BackendFactory, BatchAck, RegeneratedId, SettingsMap};
pub use theme_host::ThemeHost;
