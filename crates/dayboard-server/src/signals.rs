//! Shutdown on SIGTERM / SIGINT.
//!
//! The relay has one lifecycle signal: stop. Everything that must stop with
//! the process (the HTTP listener, the refresh timer) waits on a
//! [`ShutdownSignal`] cloned from the same [`SignalHandler`].

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Owns the shutdown flag.
#[derive(Debug, Clone)]
pub struct SignalHandler {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalHandler {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Spawns the task that turns OS signals into a shutdown.
    #[cfg(unix)]
    pub fn spawn_listener(&self) {
        use tokio::signal::unix::{SignalKind, signal};

        let tx = self.tx.clone();
        tokio::spawn(async move {
            let (mut sigterm, mut sigint) =
                match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                    (Ok(term), Ok(int)) => (term, int),
                    (Err(e), _) | (_, Err(e)) => {
                        warn!(error = %e, "failed to install signal handlers, using ctrl-c only");
                        if tokio::signal::ctrl_c().await.is_ok() {
                            info!(signal = "ctrl-c", "shutting down");
                            tx.send_replace(true);
                        }
                        return;
                    }
                };

            let name = tokio::select! {
                _ = sigterm.recv() => "SIGTERM",
                _ = sigint.recv() => "SIGINT",
            };
            info!(signal = name, "shutting down");
            tx.send_replace(true);
            debug!("signal listener done");
        });
    }

    #[cfg(not(unix))]
    pub fn spawn_listener(&self) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!(signal = "ctrl-c", "shutting down");
                tx.send_replace(true);
            }
        });
    }

    /// A waiter for the shutdown flag.
    pub fn shutdown(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.rx.clone(),
        }
    }

    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Sets the flag as if a signal had arrived.
    pub fn trigger_shutdown(&self) {
        self.tx.send_replace(true);
    }
}

/// Resolves once shutdown is signaled.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Waits for the shutdown signal. Returns immediately if it already
    /// fired, or if the handler was dropped.
    pub async fn wait(mut self) {
        let _ = self.rx.wait_for(|stop| *stop).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn trigger_releases_waiters() {
        let handler = SignalHandler::new();
        let a = tokio::spawn(handler.shutdown().wait());
        let b = tokio::spawn(handler.shutdown().wait());
        assert!(!handler.is_shutdown());

        handler.trigger_shutdown();
        tokio::time::timeout(Duration::from_secs(1), async {
            a.await.unwrap();
            b.await.unwrap();
        })
        .await
        .unwrap();
        assert!(handler.is_shutdown());
    }

    #[tokio::test]
    async fn late_waiter_returns_immediately() {
        let handler = SignalHandler::new();
        handler.trigger_shutdown();
        tokio::time::timeout(Duration::from_millis(100), handler.shutdown().wait())
            .await
            .unwrap();
    }
}
