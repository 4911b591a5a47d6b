//! Shutdown signalling shared by every blocking loop of a relayer generation.

use crate::domain::RelayerError;
use std::time::Duration;
use tokio::sync::watch;

/// Sending half: triggers shutdown for all listeners.
#[derive(Debug)]
pub struct ShutdownSignal {
    tx: watch::Sender<bool>,
}

/// Receiving half, cheap to clone.
#[derive(Clone, Debug)]
pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

/// Create a connected signal/listener pair.
pub fn shutdown_channel() -> (ShutdownSignal, ShutdownListener) {
    let (tx, rx) = watch::channel(false);
    (ShutdownSignal { tx }, ShutdownListener { rx })
}

impl ShutdownSignal {
    /// Signal shutdown. Triggering twice is a no-op.
    pub fn trigger(&self) {
        self.tx.send_if_modified(|stopped| {
            let changed = !*stopped;
            *stopped = true;
            changed
        });
    }
}

impl ShutdownListener {
    /// True once shutdown was signalled.
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once shutdown is signalled. Never resolves if the signal is
    /// dropped untriggered.
    pub async fn wait(&self) {
        let mut rx = self.rx.clone();
        loop {
            let stopped = *rx.borrow_and_update();
            if stopped {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    /// Sleep for `duration` unless shutdown comes first.
    ///
    /// # Errors
    /// - `Shutdown` if the sleep was interrupted
    pub async fn sleep(&self, duration: Duration) -> Result<(), RelayerError> {
        tokio::select! {
            _ = tokio::time::sleep(duration) => {
                if self.is_shutdown() {
                    return Err(RelayerError::Shutdown);
                }
                Ok(())
            }
            _ = self.wait() => Err(RelayerError::Shutdown),
        }
    }
}
