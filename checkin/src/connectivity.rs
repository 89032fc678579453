//! Online/offline state with edge-deduplicated transition events.
//!
//! The platform signal (browser event, OS callback, reachability probe) is
//! mapped onto `set_online`; subscribers observe exactly one event per actual
//! transition, never one per repeated identical report.

use tokio::sync::watch;

#[derive(Clone)]
pub struct ConnectivityMonitor {
    tx: watch::Sender<bool>,
}

impl ConnectivityMonitor {
    pub fn new(initially_online: bool) -> Self {
        let (tx, _) = watch::channel(initially_online);
        Self { tx }
    }

    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    /// Feeds a connectivity report in. Returns true if this was an actual
    /// edge (the stored state changed and subscribers were notified).
    pub fn set_online(&self, online: bool) -> bool {
        let changed = self.tx.send_if_modified(|state| {
            if *state == online {
                false
            } else {
                *state = online;
                true
            }
        });
        if changed {
            tracing::info!(
                "connectivity changed: {}",
                if online { "online" } else { "offline" }
            );
        }
        changed
    }

    /// Subscription for transition events; receivers wake once per edge.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn repeated_identical_reports_emit_nothing() {
        let monitor = ConnectivityMonitor::new(true);
        let mut rx = monitor.subscribe();
        rx.mark_unchanged();

        assert!(!monitor.set_online(true));
        assert!(!monitor.set_online(true));
        assert!(!rx.has_changed().unwrap());

        assert!(monitor.set_online(false));
        assert!(rx.has_changed().unwrap());
        rx.mark_unchanged();
        assert!(!monitor.set_online(false));
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn subscriber_sees_each_edge() {
        let monitor = ConnectivityMonitor::new(false);
        let mut rx = monitor.subscribe();
        rx.mark_unchanged();

        monitor.set_online(true);
        rx.changed().await.unwrap();
        assert!(*rx.borrow());

        monitor.set_online(false);
        rx.changed().await.unwrap();
        assert!(!*rx.borrow());
    }
}
