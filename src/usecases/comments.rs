//! Comments Use Case - Fan Discussion per Player
//!
//! Validates new comments and comment votes, then applies them to the
//! document store. Replies are ordinary comments carrying a parent id.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::adapters::metrics::MetricsRegistry;
use crate::domain::comment::{COMMENT_LIST_LIMIT, Comment, NewComment};
use crate::domain::vote::{VoteDirection, VoteTally};
use crate::error::CommentError;
use crate::ports::document_store::DocumentStore;

/// Post, list and vote on comments.
pub struct CommentService<S: DocumentStore> {
  store: Arc<S>,
  metrics: Option<Arc<MetricsRegistry>>,
}

impl<S: DocumentStore> CommentService<S> {
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

  /// Validate and store a comment.
  ///
  /// # Errors
  /// `MissingFields` or `TooLong` for bad input, `Storage` on write failure.
  #[instrument(skip(self, submission))]
  pub async fn post(&self, submission: NewComment) -> Result<Comment, CommentError> {
    let comment = submission.validate(Utc::now())?;

    self.store.add_comment(comment.clone()).await.map_err(|e| {
      warn!(player_id = %comment.player_id, error = %e, "Comment write failed");
      CommentError::Storage(format!("{e:#}"))
    })?;

    if let Some(metrics) = &self.metrics {
      metrics.comments_posted.inc();
    }
    info!(
      comment_id = %comment.id,
      player_id = %comment.player_id,
      reply = comment.is_reply(),
      "Comment posted"
    );

    Ok(comment)
  }

  /// Newest comments on a player.
  ///
  /// # Errors
  /// `MissingPlayerId` for a blank id, `Storage` on read failure.
  pub async fn list(&self, player_id: Option<&str>) -> Result<Vec<Comment>, CommentError> {
    let player_id = player_id
      .map(str::trim)
      .filter(|id| !id.is_empty())
      .ok_or(CommentError::MissingPlayerId)?;

    self
      .store
      .list_comments(player_id, COMMENT_LIST_LIMIT)
      .await
      .map_err(|e| CommentError::Storage(format!("{e:#}")))
  }

  /// Add one vote to a comment, returning its updated tally.
  ///
  /// # Errors
  /// `MissingVote`, `InvalidVoteType` or `NotFound` for bad input,
  /// `Storage` on write failure.
  #[instrument(skip(self))]
  pub async fn vote(
    &self,
    comment_id: Option<&str>,
    vote_type: Option<&str>,
  ) -> Result<VoteTally, CommentError> {
    let (Some(comment_id), Some(raw)) = (
      comment_id.map(str::trim).filter(|id| !id.is_empty()),
      vote_type.filter(|v| !v.is_empty()),
    ) else {
      return Err(CommentError::MissingVote);
    };
    let direction: VoteDirection = raw
      .parse()
      .map_err(|_| CommentError::InvalidVoteType(raw.to_string()))?;

    let tally = self
      .store
      .vote_comment(comment_id, direction)
      .await
      .map_err(|e| CommentError::Storage(format!("{e:#}")))?
      .ok_or_else(|| CommentError::NotFound(comment_id.to_string()))?;

    if let Some(metrics) = &self.metrics {
      metrics.record_comment_vote(direction);
    }
    Ok(tally)
  }
}
