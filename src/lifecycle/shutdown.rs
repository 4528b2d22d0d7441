//! Shutdown coordination.
//!
//! Subscribers on trigger:
//! - HTTP server (plain or TLS): drains open connections
//! - config update loop: stops applying reloads
//! - rate-limit sweeper: stops ticking

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown.
///
/// `main` triggers it from the signal task; `HttpServer::run` and
/// `run_tls` hand a receiver to each background task they spawn.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Number of tasks still listening.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
