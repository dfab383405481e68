//! Eviction sweeper — periodic removal of inactive participants.
//!
//! DESIGN
//! ======
//! A background task ticks every `period` and runs one eviction pass through
//! the presence manager. It shares nothing with request handlers except the
//! stores behind that manager.
//!
//! ERROR HANDLING
//! ==============
//! A failed pass is logged and dropped. The schedule keeps running; stale
//! participants stay stale and are picked up on the next tick.
//!
//! LIFECYCLE
//! =========
//! [`Sweeper`] owns the task. `shutdown` stops it cleanly; dropping the
//! handle aborts it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::presence::{PresenceManager, SweepReport};

pub struct Sweeper {
    handle: Option<JoinHandle<()>>,
    shutdown_tx: watch::Sender<bool>,
}

impl Sweeper {
    /// Signal the task to stop and wait for it to finish its current tick.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        info!("eviction sweeper stopped");
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Spawn the eviction sweeper. The first pass runs one `period` after start.
#[must_use]
pub fn spawn_sweeper(presence: Arc<PresenceManager>, period: Duration) -> Sweeper {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    info!(period_secs = period.as_secs_f64(), "eviction sweeper configured");

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.changed() => break,
                _ = ticker.tick() => {
                    run_tick(&presence).await;
                }
            }
        }
    });

    Sweeper { handle: Some(handle), shutdown_tx }
}

/// Run one eviction pass and log the outcome.
pub async fn run_tick(presence: &PresenceManager) -> SweepReport {
    let report = presence.evict_stale().await;
    debug!(cutoff = report.cutoff, evicted = report.evicted.len(), "sweep tick");

    if let Some(e) = &report.error {
        warn!(error = %e, unprocessed = report.abandoned, "sweep tick abandoned");
    }
    report
}

#[cfg(test)]
#[path = "sweeper_test.rs"]
mod tests;
