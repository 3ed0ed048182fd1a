//! Votes Use Case - Community Hype Voting
//!
//! Validates vote requests and applies them to the document store.
//! Tallies only grow; there is no retraction.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::adapters::metrics::MetricsRegistry;
use crate::domain::vote::{VoteDirection, VoteTally};
use crate::error::VoteError;
use crate::ports::document_store::DocumentStore;

/// Cast and read player votes.
pub struct VoteService<S: DocumentStore> {
  store: Arc<S>,
  metrics: Option<Arc<MetricsRegistry>>,
}

impl<S: DocumentStore> VoteService<S> {
  pub const fn new(store: Arc<S>) -> Self {
    Self {
      store,
      metrics: None,
    }
  }

  /// Attach Prometheus metrics.
  #[must_use]
  pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
    self.metrics = Some(metrics);
    self
  }

  /// Validate and record one vote, returning the updated tally.
  ///
  /// # Errors
  /// `MissingPlayerId` or `InvalidVoteType` for bad input,
  /// `Storage` when the store rejects the write.
  #[instrument(skip(self))]
  pub async fn cast(
    &self,
    player_id: Option<&str>,
    vote_type: Option<&str>,
  ) -> Result<VoteTally, VoteError> {
    let player_id = validate_player_id(player_id)?;
    let raw = vote_type.unwrap_or_default();
    let direction: VoteDirection = raw
      .parse()
      .map_err(|_| VoteError::InvalidVoteType(raw.to_string()))?;

    let tally = self
      .store
      .record_vote(player_id, direction)
      .await
      .map_err(|e| {
        warn!(player_id, error = %e, "Vote write failed");
        VoteError::Storage(format!("{e:#}"))
      })?;

    if let Some(metrics) = &self.metrics {
      metrics.record_vote(direction);
    }
    info!(
      player_id,
      direction = direction.as_str(),
      score = tally.score(),
      "Vote recorded"
    );

    Ok(tally)
  }

  /// Current tally; `{0, 0}` for players nobody has voted on.
  ///
  /// # Errors
  /// `MissingPlayerId` for a blank id, `Storage` on read failure.
  pub async fn tally(&self, player_id: &str) -> Result<VoteTally, VoteError> {
    let player_id = validate_player_id(Some(player_id))?;
    self
      .store
      .get_vote_tally(player_id)
      .await
      .map_err(|e| VoteError::Storage(format!("{e:#}")))
  }
}

fn validate_player_id(player_id: Option<&str>) -> Result<&str, VoteError> {
  player_id
    .map(str::trim)
    .filter(|id| !id.is_empty())
    .ok_or(VoteError::MissingPlayerId)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::adapters::persistence::MemoryStore;

  #[tokio::test]
  async fn test_cast_and_read() {
    let service = VoteService::new(Arc::new(MemoryStore::new()));

    service.cast(Some("p1"), Some("up")).await.unwrap();
    service.cast(Some("p1"), Some("up")).await.unwrap();
    let tally = service.cast(Some(" p1 "), Some("down")).await.unwrap();

    assert_eq!(tally, VoteTally::new(2, 1));
    assert_eq!(service.tally("p1").await.unwrap().score(), 1);
    assert_eq!(service.tally("p2").await.unwrap(), VoteTally::default());
  }

  #[tokio::test]
  async fn test_rejects_bad_input() {
    let service = VoteService::new(Arc::new(MemoryStore::new()));

    assert_eq!(
      service.cast(None, Some("up")).await,
      Err(VoteError::MissingPlayerId)
    );
    assert_eq!(
      service.cast(Some("  "), Some("up")).await,
      Err(VoteError::MissingPlayerId)
    );
    assert_eq!(
      service.cast(Some("p1"), Some("sideways")).await,
      Err(VoteError::InvalidVoteType("sideways".into()))
    );
    assert_eq!(
      service.cast(Some("p1"), None).await,
      Err(VoteError::InvalidVoteType(String::new()))
    );
  }
}
