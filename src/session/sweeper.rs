//! Periodic eviction of idle sessions.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::config::SessionConfig;
use crate::session::MemorySessionStore;

/// Background task dropping sessions idle longer than the configured timeout.
pub struct SessionSweeper {
    store: MemorySessionStore,
    idle_timeout: Duration,
    interval: Duration,
}

impl SessionSweeper {
    pub fn new(store: MemorySessionStore, config: &SessionConfig) -> Self {
        Self {
            store,
            idle_timeout: Duration::from_secs(config.idle_timeout_secs),
            interval: Duration::from_secs(config.sweep_interval_secs.max(1)),
        }
    }

    /// One eviction pass.
    pub fn sweep(&self) -> usize {
        let evicted = self.store.evict_idle(self.idle_timeout);
        if evicted > 0 {
            tracing::debug!(evicted, remaining = self.store.len(), "Idle sessions evicted");
        }
        evicted
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            idle_timeout_secs = self.idle_timeout.as_secs(),
            interval_secs = self.interval.as_secs(),
            "Session sweeper starting"
        );

        let mut ticker = time::interval(self.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep();
                }
                _ = shutdown.recv() => {
                    tracing::info!("Session sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
