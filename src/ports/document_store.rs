//! Document Store Port - Persistence Interface
//!
//! Collections: player snapshots (one per player), events (append-only),
//! vote tallies (one per player), fan comments and a single sync
//! metadata record.
//! Writes from a sync run go through one `WriteBatch` that the store
//! must apply atomically: all of it becomes visible, or none of it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::comment::Comment;
use crate::domain::event::{EventKind, PortalEvent};
use crate::domain::player::PlayerSnapshot;
use crate::domain::vote::{VoteDirection, VoteTally};

/// Default number of events returned by a listing.
pub const DEFAULT_EVENT_LIMIT: usize = 50;

/// Upper bound on events returned by a single listing.
pub const MAX_EVENT_LIMIT: usize = 500;

/// Newest-first event listing options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventQuery {
  /// Only events of this kind; `None` means all kinds.
  pub kind: Option<EventKind>,
  /// Maximum events returned.
  pub limit: usize,
}

impl EventQuery {
  /// Build a query, clamping the limit to `1..=MAX_EVENT_LIMIT`.
  pub fn new(kind: Option<EventKind>, limit: Option<usize>) -> Self {
    Self {
      kind,
      limit: limit
        .unwrap_or(DEFAULT_EVENT_LIMIT)
        .clamp(1, MAX_EVENT_LIMIT),
    }
  }

  /// Whether an event passes the kind filter.
  pub fn matches(&self, event: &PortalEvent) -> bool {
    self.kind.is_none_or(|kind| event.kind == kind)
  }
}

impl Default for EventQuery {
  fn default() -> Self {
    Self::new(None, None)
  }
}

/// Pending writes of one sync run.
///
/// Nothing is visible until the batch is handed to
/// [`DocumentStore::commit`]. Dropping the batch discards it.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
  snapshots: Vec<PlayerSnapshot>,
  events: Vec<PortalEvent>,
  last_sync: Option<DateTime<Utc>>,
}

impl WriteBatch {
  pub fn new() -> Self {
    Self::default()
  }

  /// Replace the stored snapshot for `snapshot.id`.
  pub fn upsert_snapshot(&mut self, snapshot: PlayerSnapshot) {
    self.snapshots.push(snapshot);
  }

  /// Append a new event.
  pub fn insert_event(&mut self, event: PortalEvent) {
    self.events.push(event);
  }

  /// Record the run time as the global "last sync".
  pub fn set_last_sync(&mut self, at: DateTime<Utc>) {
    self.last_sync = Some(at);
  }

  pub fn snapshots(&self) -> &[PlayerSnapshot] {
    &self.snapshots
  }

  pub fn events(&self) -> &[PortalEvent] {
    &self.events
  }

  pub const fn last_sync(&self) -> Option<DateTime<Utc>> {
    self.last_sync
  }

  /// Total number of write operations.
  pub fn len(&self) -> usize {
    self.snapshots.len() + self.events.len() + usize::from(self.last_sync.is_some())
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Split into owned parts for the store to apply.
  pub fn into_parts(self) -> (Vec<PlayerSnapshot>, Vec<PortalEvent>, Option<DateTime<Utc>>) {
    (self.snapshots, self.events, self.last_sync)
  }
}

/// Trait for document persistence providers.
///
/// Implementations must make `commit` atomic and must never modify
/// or delete an event once it has been committed.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
  /// Point read of one player's snapshot. `None` means never observed.
  async fn get_snapshot(&self, player_id: &str) -> anyhow::Result<Option<PlayerSnapshot>>;

  /// All stored snapshots (roster listings).
  async fn list_snapshots(&self) -> anyhow::Result<Vec<PlayerSnapshot>>;

  /// Vote tally for a player; `{0, 0}` when nobody has voted yet.
  async fn get_vote_tally(&self, player_id: &str) -> anyhow::Result<VoteTally>;

  /// Add one vote and return the updated tally.
  async fn record_vote(
    &self,
    player_id: &str,
    direction: VoteDirection,
  ) -> anyhow::Result<VoteTally>;

  /// Apply every write in the batch atomically.
  async fn commit(&self, batch: WriteBatch) -> anyhow::Result<()>;

  /// Events newest-first, filtered and limited by `query`.
  async fn list_events(&self, query: &EventQuery) -> anyhow::Result<Vec<PortalEvent>>;

  /// Time of the last committed sync run.
  async fn last_sync(&self) -> anyhow::Result<Option<DateTime<Utc>>>;

  /// Store a new comment.
  async fn add_comment(&self, comment: Comment) -> anyhow::Result<()>;

  /// Comments on one player, newest first, at most `limit`.
  async fn list_comments(&self, player_id: &str, limit: usize) -> anyhow::Result<Vec<Comment>>;

  /// Add one vote to a comment. `None` when the comment does not exist.
  async fn vote_comment(
    &self,
    comment_id: &str,
    direction: VoteDirection,
  ) -> anyhow::Result<Option<VoteTally>>;

  /// Check if the store is reachable and writable.
  async fn is_healthy(&self) -> bool;
}
