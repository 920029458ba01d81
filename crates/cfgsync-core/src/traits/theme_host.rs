// # Theme Host Trait
//
// The external theming library. The engine only forwards a mode and an
// accent color; deriving palettes from the color is the host's job.

use crate::codec::ThemeMode;

/// Trait for theming collaborators
///
/// Calls are synchronous: they are made from store observers, which run
/// inline right after a mutation.
pub trait ThemeHost: Send + Sync {
    /// Switch between automatic, dark and light appearance
    fn set_theme(&self, mode: ThemeMode) -> Result<(), crate::Error>;

    /// Derive and install a color scheme from an accent color
    fn set_color_scheme(&self, color: &str) -> Result<(), crate::Error>;

    /// Get the host name (for logging/debugging)
    fn host_name(&self) -> &'static str;
}
