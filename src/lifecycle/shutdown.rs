//! Shutdown coordination.
//!
//! A single latched flag: once triggered it stays triggered, so a task that
//! starts listening after the signal still sees it.

use tokio::sync::watch;

/// Owner side of the shutdown flag.
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

/// Listener handed to each long-running task (HTTP server, expiry sweeper).
#[derive(Clone)]
pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub fn subscribe(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
        }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownListener {
    /// Resolve once shutdown has been triggered or the owner is gone.
    pub async fn recv(&mut self) {
        loop {
            let stopped = *self.rx.borrow_and_update();
            if stopped || self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_reaches_all_listeners() {
        let shutdown = Shutdown::new();
        let mut a = shutdown.subscribe();
        let mut b = a.clone();

        shutdown.trigger();
        assert!(shutdown.is_triggered());
        a.recv().await;
        b.recv().await;
    }

    #[tokio::test]
    async fn test_late_listener_sees_earlier_trigger() {
        let shutdown = Shutdown::new();
        shutdown.trigger();

        let mut late = shutdown.subscribe();
        tokio::time::timeout(Duration::from_secs(1), late.recv())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_dropped_owner_releases_listener() {
        let shutdown = Shutdown::new();
        let mut listener = shutdown.subscribe();
        drop(shutdown);

        tokio::time::timeout(Duration::from_secs(1), listener.recv())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_untriggered_listener_waits() {
        let shutdown = Shutdown::new();
        let mut listener = shutdown.subscribe();

        let waited = tokio::time::timeout(Duration::from_millis(20), listener.recv()).await;
        assert!(waited.is_err());
    }
}
