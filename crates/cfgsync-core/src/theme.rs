//! Forwarding theme settings to the theme host
//!
//! [`ThemeApplier`] reads `theme_mode` and `theme_color` from a settings
//! snapshot and calls the [`ThemeHost`]. Host failures are logged and
//! swallowed: a theme that fails to apply never fails a settings operation.

use std::sync::Arc;
use tracing::{debug, error, info};

use crate::codec::ThemeMode;
use crate::settings::Settings;
use crate::traits::ThemeHost;

/// Applies theme fields to a [`ThemeHost`]
pub struct ThemeApplier {
    host: Arc<dyn ThemeHost>,
}

impl std::fmt::Debug for ThemeApplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeApplier")
            .field("host", &self.host.host_name())
            .finish()
    }
}

impl ThemeApplier {
    pub fn new(host: Arc<dyn ThemeHost>) -> Self {
        Self { host }
    }

    /// Apply the appearance mode, then the accent color if one is configured
    pub fn apply_theme(&self, settings: &Settings) {
        debug!("Applying theme mode {}", settings.theme_mode);
        if let Err(e) = self.host.set_theme(settings.theme_mode) {
            error!("Failed to apply theme mode {}: {}", settings.theme_mode, e);
        }

        if settings.has_color_override() {
            self.apply_color_scheme(settings);
        }
    }

    /// Apply the accent color
    ///
    /// Never forwards the default sentinel. Calling it twice with the same
    /// color issues the same host call twice.
    pub fn apply_color_scheme(&self, settings: &Settings) {
        if !settings.has_color_override() {
            debug!("No accent color override configured, keeping host default");
            return;
        }

        if let Err(e) = self.host.set_color_scheme(&settings.theme_color) {
            error!(
                "Failed to apply color scheme {}: {}",
                settings.theme_color, e
            );
        }
    }
}

/// Theme host for headless processes: records the request in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingThemeHost;

impl ThemeHost for TracingThemeHost {
    fn set_theme(&self, mode: ThemeMode) -> crate::Result<()> {
        info!("Theme mode set to {}", mode);
        Ok(())
    }

    fn set_color_scheme(&self, color: &str) -> crate::Result<()> {
        info!("Color scheme derived from {}", color);
        Ok(())
    }

    fn host_name(&self) -> &'static str {
        "tracing"
    }
}
