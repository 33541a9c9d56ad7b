// Connectivity Probe Port (Interface)

use tokio::sync::watch;

/// Online/offline signal: a synchronously readable flag plus an
/// edge-triggered subscription.
///
/// Injected explicitly (never read from an ambient global) so tests can
/// drive connectivity transitions deterministically.
pub trait ConnectivityProbe: Send + Sync {
    /// Synchronous online check
    fn is_online(&self) -> bool;

    /// Subscribe to connectivity transitions. The receiver yields the new
    /// state on every change; subscribers watch for the `false -> true`
    /// edge to trigger a queue flush.
    fn subscribe(&self) -> watch::Receiver<bool>;
}

/// Watch-channel backed probe (production and tests).
///
/// The owner of the probe reports transitions via `set_online`; everything
/// downstream observes them through the `ConnectivityProbe` interface.
pub struct WatchConnectivityProbe {
    tx: watch::Sender<bool>,
}

impl WatchConnectivityProbe {
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = watch::channel(online);
        Self { tx }
    }

    /// Report a connectivity change. Re-sending the current state is a
    /// no-op for subscribers (watch channels only wake on modification).
    pub fn set_online(&self, online: bool) {
        self.tx.send_if_modified(|state| {
            let changed = *state != online;
            *state = online;
            changed
        });
    }
}

impl Default for WatchConnectivityProbe {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConnectivityProbe for WatchConnectivityProbe {
    fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}
