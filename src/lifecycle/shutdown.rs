//! Cooperative shutdown signaling.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::broadcast;

/// Broadcast-based shutdown signal shared by the router's long-lived
/// tasks.
///
/// Triggering is idempotent; every subscriber observes the signal once.
pub struct ShutdownSignal {
    tx: broadcast::Sender<()>,
    triggered: AtomicBool,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            triggered: AtomicBool::new(false),
        }
    }

    /// Subscribe before spawning a task that must observe shutdown.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Fire the signal. Safe to call more than once.
    pub fn trigger(&self) {
        if !self.triggered.swap(true, Ordering::SeqCst) {
            // No receivers is fine: nothing was running.
            let _ = self.tx.send(());
        }
    }

    /// Whether the signal has fired.
    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_observe_trigger() {
        let signal = ShutdownSignal::new();
        let mut rx = signal.subscribe();
        signal.trigger();
        assert!(rx.recv().await.is_ok());
        assert!(signal.is_triggered());
    }

    #[tokio::test]
    async fn test_trigger_is_idempotent() {
        let signal = ShutdownSignal::new();
        let mut rx = signal.subscribe();
        signal.trigger();
        signal.trigger();
        assert!(rx.recv().await.is_ok());
        // Second trigger did not queue a second message.
        assert!(rx.try_recv().is_err());
    }
}
