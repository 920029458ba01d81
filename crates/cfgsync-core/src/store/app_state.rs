// # Application State
//
// Transient process flags with no backend relationship: window
// visibility, connectivity and a busy indicator. Consumers either read a
// snapshot or follow changes through a `tokio::sync::watch` channel.

use serde::Serialize;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Snapshot of the transient flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AppFlags {
    pub main_window_visible: bool,
    pub topbar_visible: bool,
    pub online: bool,
    pub loading: bool,
}

impl Default for AppFlags {
    fn default() -> Self {
        Self {
            main_window_visible: true,
            topbar_visible: false,
            online: true,
            loading: false,
        }
    }
}

/// Observable holder of [`AppFlags`]
#[derive(Debug)]
pub struct AppState {
    tx: watch::Sender<AppFlags>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AppFlags::default());
        Self { tx }
    }

    /// Current flags
    pub fn snapshot(&self) -> AppFlags {
        *self.tx.borrow()
    }

    /// Receiver that observes every later change
    pub fn subscribe(&self) -> watch::Receiver<AppFlags> {
        self.tx.subscribe()
    }

    /// Stream of flag values, starting with the current one
    pub fn changes(&self) -> WatchStream<AppFlags> {
        WatchStream::new(self.tx.subscribe())
    }

    pub fn set_main_window_visible(&self, visible: bool) -> bool {
        self.update(|flags| &mut flags.main_window_visible, visible)
    }

    pub fn set_topbar_visible(&self, visible: bool) -> bool {
        self.update(|flags| &mut flags.topbar_visible, visible)
    }

    pub fn set_online(&self, online: bool) -> bool {
        self.update(|flags| &mut flags.online, online)
    }

    pub fn set_loading(&self, loading: bool) -> bool {
        self.update(|flags| &mut flags.loading, loading)
    }

    /// Set one flag; subscribers are only woken when the value changes
    fn update(&self, select: impl FnOnce(&mut AppFlags) -> &mut bool, value: bool) -> bool {
        self.tx.send_if_modified(|flags| {
            let slot = select(flags);
            if *slot == value {
                false
            } else {
                *slot = value;
                true
            }
        })
    }
}
