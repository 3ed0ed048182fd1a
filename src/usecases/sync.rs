//! Sync Use Case - One Transfer-portal Sync Run
//!
//! The side-effecting shell around [`ChangeDetector`]:
//! 1. Fetch the current player list from the feed
//! 2. Look up stored snapshots and vote tallies (concurrently)
//! 3. Detect events against the previous snapshots
//! 4. Commit snapshots, events and the last-sync time as one batch
//!
//! Steps 1-3 run under the configured deadline and give way to
//! cancellation. Step 4 is never interrupted: a run either commits
//! everything or nothing.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt, TryStreamExt};
use tokio::sync::{Mutex, watch};
use tracing::{error, info, instrument, warn};

use crate::adapters::metrics::MetricsRegistry;
use crate::config::SyncConfig;
use crate::domain::detector::{ChangeDetector, Detection};
use crate::domain::event::EventKind;
use crate::domain::player::{PlayerId, PlayerRecord, PlayerSnapshot};
use crate::domain::vote::VoteTally;
use crate::error::SyncError;
use crate::ports::document_store::{DocumentStore, WriteBatch};
use crate::ports::portal_feed::PortalFeed;

/// Result of a committed (or no-data) run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
  /// Players with a valid identifier, one snapshot each.
  pub players_processed: usize,
  /// Events committed by this run.
  pub events_created: usize,
  /// Records skipped for a missing identifier.
  pub skipped_records: usize,
  /// Records dropped because their identifier repeated.
  pub duplicate_records: usize,
  /// The feed returned nothing; nothing was written.
  pub no_data: bool,
  pub started_at: DateTime<Utc>,
  pub finished_at: DateTime<Utc>,
}

impl SyncReport {
  fn no_data(started_at: DateTime<Utc>) -> Self {
    Self {
      players_processed: 0,
      events_created: 0,
      skipped_records: 0,
      duplicate_records: 0,
      no_data: true,
      started_at,
      finished_at: Utc::now(),
    }
  }

  /// Human-readable summary for API responses.
  pub fn message(&self) -> String {
    if self.no_data {
      "No player data available".to_string()
    } else {
      format!(
        "Synced {} players, created {} events",
        self.players_processed, self.events_created
      )
    }
  }
}

/// Stored state gathered before detection.
#[derive(Default)]
struct Baseline {
  previous: HashMap<PlayerId, PlayerSnapshot>,
  tallies: HashMap<PlayerId, VoteTally>,
}

/// Runs portal syncs against a feed and a document store.
///
/// Only one run executes at a time per instance; overlapping callers
/// wait for the running one to finish.
pub struct PortalSync<F: PortalFeed, S: DocumentStore> {
  feed: Arc<F>,
  store: Arc<S>,
  detector: ChangeDetector,
  /// Bound on fetch + lookups + detection.
  deadline: Duration,
  /// Maximum in-flight store lookups.
  lookup_concurrency: usize,
  metrics: Option<Arc<MetricsRegistry>>,
  run_guard: Mutex<()>,
}

impl<F: PortalFeed, S: DocumentStore> PortalSync<F, S> {
  /// Create a sync use case.
  pub fn new(feed: Arc<F>, store: Arc<S>, detector: ChangeDetector, config: &SyncConfig) -> Self {
    Self {
      feed,
      store,
      detector,
      deadline: Duration::from_secs(config.deadline_seconds),
      lookup_concurrency: config.lookup_concurrency.max(1),
      metrics: None,
      run_guard: Mutex::new(()),
    }
  }

  /// Attach Prometheus metrics.
  #[must_use]
  pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
    self.metrics = Some(metrics);
    self
  }

  /// Override the run deadline.
  #[must_use]
  pub const fn with_deadline(mut self, deadline: Duration) -> Self {
    self.deadline = deadline;
    self
  }

  pub fn store(&self) -> &Arc<S> {
    &self.store
  }

  /// Execute one sync run.
  ///
  /// `cancel` flipping to `true` before the commit starts drops the
  /// batch and returns [`SyncError::Cancelled`].
  ///
  /// # Errors
  /// Any [`SyncError`]; in every case nothing from this run was written.
  #[instrument(skip(self, cancel), fields(source = %self.feed.source_name()))]
  pub async fn run(&self, cancel: &watch::Receiver<bool>) -> Result<SyncReport, SyncError> {
    let _guard = self.run_guard.lock().await;
    let started = Instant::now();
    let started_at = Utc::now();

    info!("Starting portal sync");
    let result = self.execute(cancel.clone(), started_at).await;
    let elapsed = started.elapsed().as_secs_f64();

    match &result {
      Ok(report) => {
        info!(
          players = report.players_processed,
          events = report.events_created,
          skipped = report.skipped_records,
          duplicates = report.duplicate_records,
          no_data = report.no_data,
          elapsed_secs = elapsed,
          "Portal sync finished"
        );
        if let Some(metrics) = &self.metrics {
          metrics.record_run(if report.no_data { "no_data" } else { "ok" }, elapsed);
        }
      }
      Err(e) => {
        error!(error = %e, elapsed_secs = elapsed, "Portal sync failed");
        if let Some(metrics) = &self.metrics {
          metrics.record_run(e.outcome(), elapsed);
        }
      }
    }

    result
  }

  async fn execute(
    &self,
    mut cancel: watch::Receiver<bool>,
    started_at: DateTime<Utc>,
  ) -> Result<SyncReport, SyncError> {
    if *cancel.borrow_and_update() {
      return Err(SyncError::Cancelled);
    }

    let prepared = tokio::select! {
      biased;
      () = cancelled(&mut cancel) => return Err(SyncError::Cancelled),
      result = tokio::time::timeout(self.deadline, self.prepare(started_at)) => match result {
        Ok(prepared) => prepared?,
        Err(_) => {
          return Err(SyncError::DeadlineExceeded {
            deadline: self.deadline,
          });
        }
      },
    };

    let Some((batch, detection)) = prepared else {
      return Ok(SyncReport::no_data(started_at));
    };

    // Last chance to back out; past this point the batch is committed.
    if *cancel.borrow() {
      warn!(writes = batch.len(), "Cancelled before commit, dropping batch");
      return Err(SyncError::Cancelled);
    }

    let kinds: Vec<EventKind> = batch.events().iter().map(|e| e.kind).collect();
    self
      .store
      .commit(batch)
      .await
      .map_err(|e| SyncError::StorageUnavailable(format!("{e:#}")))?;

    if let Some(metrics) = &self.metrics {
      metrics.record_events(&kinds);
      metrics
        .players_processed
        .set(i64::try_from(detection.players_processed()).unwrap_or(i64::MAX));
      metrics.records_skipped.inc_by(detection.skipped as u64);
    }

    Ok(SyncReport {
      players_processed: detection.players_processed(),
      events_created: kinds.len(),
      skipped_records: detection.skipped,
      duplicate_records: detection.duplicates,
      no_data: false,
      started_at,
      finished_at: Utc::now(),
    })
  }

  /// Fetch, look up and detect. `None` means the feed had no data.
  async fn prepare(
    &self,
    now: DateTime<Utc>,
  ) -> Result<Option<(WriteBatch, Detection)>, SyncError> {
    let records = self
      .feed
      .fetch_players()
      .await
      .map_err(|e| SyncError::FetchFailed(format!("{e:#}")))?;

    if records.is_empty() {
      info!("Feed returned no players, nothing to sync");
      return Ok(None);
    }

    let baseline = self.load_baseline(&records).await?;
    let detection = self
      .detector
      .detect(&baseline.previous, &records, &baseline.tallies, now);

    let mut batch = WriteBatch::new();
    for snapshot in detection.next_snapshots.values() {
      batch.upsert_snapshot(snapshot.clone());
    }
    for event in &detection.events {
      batch.insert_event(event.clone());
    }
    batch.set_last_sync(now);

    Ok(Some((batch, detection)))
  }

  /// Stored snapshot and vote tally for every distinct identifier.
  ///
  /// A failed snapshot read fails the run. A failed tally read falls
  /// back to a zero tally for that player only.
  async fn load_baseline(&self, records: &[PlayerRecord]) -> Result<Baseline, SyncError> {
    let mut seen = HashSet::with_capacity(records.len());
    let ids: Vec<&str> = records
      .iter()
      .filter_map(PlayerRecord::key)
      .filter(|id| seen.insert(*id))
      .collect();

    // try_collect drops the stream on the first failed snapshot read,
    // so no further lookups are started against a failing store.
    let lookups: Vec<_> = stream::iter(ids)
      .map(|id| async move {
        let snapshot = self.store.get_snapshot(id).await.map_err(|e| {
          SyncError::StorageUnavailable(format!("snapshot lookup for {id}: {e:#}"))
        })?;
        let tally = match self.store.get_vote_tally(id).await {
          Ok(tally) => tally,
          Err(e) => {
            warn!(player_id = %id, error = %e, "Vote tally lookup failed, using zero");
            VoteTally::default()
          }
        };
        Ok::<_, SyncError>((id, snapshot, tally))
      })
      .buffer_unordered(self.lookup_concurrency)
      .boxed()
      .try_collect()
      .await?;

    let mut baseline = Baseline::default();
    for (id, snapshot, tally) in lookups {
      if let Some(snapshot) = snapshot {
        baseline.previous.insert(id.to_string(), snapshot);
      }
      baseline.tallies.insert(id.to_string(), tally);
    }

    Ok(baseline)
  }
}

/// Resolves once `cancel` reads `true`. Never resolves if the sender is gone.
pub(crate) async fn cancelled(cancel: &mut watch::Receiver<bool>) {
  let sender_dropped = cancel.wait_for(|cancelled| *cancelled).await.is_err();
  if sender_dropped {
    std::future::pending::<()>().await;
  }
}
