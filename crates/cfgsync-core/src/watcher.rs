//! Automatic theme re-application on settings changes
//!
//! The watcher is a [`SettingsObserver`] with two rules:
//!
//! - `theme_mode` changed → [`ThemeApplier::apply_theme`]
//! - `theme_color` changed → [`ThemeApplier::apply_color_scheme`]
//!
//! Both only fire once the store is loaded. Changes coming from a load or
//! from an optimistic local write are ignored, since those operations
//! apply the theme themselves.

use std::sync::Arc;
use tracing::trace;

use crate::codec::Field;
use crate::settings::Settings;
use crate::store::{ChangeEvent, ChangeOrigin, SettingsObserver};
use crate::theme::ThemeApplier;

#[derive(Debug)]
pub struct ChangeWatcher {
    theme: Arc<ThemeApplier>,
}

impl ChangeWatcher {
    pub fn new(theme: Arc<ThemeApplier>) -> Self {
        Self { theme }
    }
}

impl SettingsObserver for ChangeWatcher {
    fn on_change(&self, settings: &Settings, event: &ChangeEvent) {
        if !settings.loaded {
            trace!("Ignoring {} change before initial load", event.field);
            return;
        }

        if matches!(event.origin, ChangeOrigin::Load | ChangeOrigin::Optimistic) {
            return;
        }

        match event.field {
            Field::ThemeMode => self.theme.apply_theme(settings),
            Field::ThemeColor => self.theme.apply_color_scheme(settings),
            _ => {}
        }
    }
}
