//! Sync Scheduler - Periodic Sync Loop
//!
//! Triggers a sync every `interval_seconds` until shutdown. Failures
//! are logged and the next tick simply tries again; there is no
//! retry inside a tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{info, instrument, warn};

use super::sync::{PortalSync, cancelled};
use crate::config::SyncConfig;
use crate::ports::document_store::DocumentStore;
use crate::ports::portal_feed::PortalFeed;

pub struct SyncScheduler<F: PortalFeed, S: DocumentStore> {
  sync: Arc<PortalSync<F, S>>,
  /// Zero disables periodic runs.
  interval: Duration,
  run_on_startup: bool,
}

impl<F: PortalFeed, S: DocumentStore> SyncScheduler<F, S> {
  pub fn new(sync: Arc<PortalSync<F, S>>, config: &SyncConfig) -> Self {
    Self {
      sync,
      interval: Duration::from_secs(config.interval_seconds),
      run_on_startup: config.run_on_startup,
    }
  }

  /// Run until `shutdown` reads `true`. Returns the number of runs started.
  #[instrument(skip_all)]
  pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> usize {
    let cancel = shutdown.clone();
    let mut runs = 0;

    if self.interval.is_zero() {
      if self.run_on_startup && !*cancel.borrow() {
        self.tick(&cancel).await;
        runs += 1;
      }
      info!("Periodic sync disabled, waiting for shutdown");
      cancelled(&mut shutdown).await;
      return runs;
    }

    let mut ticker = tokio::time::interval(self.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    if !self.run_on_startup {
      // The first tick completes immediately.
      ticker.tick().await;
    }

    info!(interval_secs = self.interval.as_secs(), "Sync scheduler started");

    loop {
      tokio::select! {
        biased;
        () = cancelled(&mut shutdown) => break,
        _ = ticker.tick() => {
          self.tick(&cancel).await;
          runs += 1;
        }
      }
    }

    info!(runs, "Sync scheduler stopped");
    runs
  }

  async fn tick(&self, cancel: &watch::Receiver<bool>) {
    if let Err(e) = self.sync.run(cancel).await {
      warn!(error = %e, "Scheduled sync failed, will retry next interval");
    }
  }
}
