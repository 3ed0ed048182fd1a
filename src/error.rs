//! Error Types - Run-level and Request-level Failures
//!
//! Ports return `anyhow::Result`; the use cases translate those into
//! the typed errors below so the HTTP layer and the scheduler can
//! decide on status codes and retries without string matching.

use std::time::Duration;

use thiserror::Error;

/// A sync run that did not commit.
///
/// Every variant means nothing from the run was written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("portal fetch failed: {0}")]
    FetchFailed(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("sync cancelled before commit")]
    Cancelled,

    #[error("sync exceeded deadline of {deadline:?}")]
    DeadlineExceeded { deadline: Duration },
}

impl SyncError {
    /// Short label used for the `outcome` metric.
    pub const fn outcome(&self) -> &'static str {
        match self {
            Self::FetchFailed(_) => "fetch_failed",
            Self::StorageUnavailable(_) => "storage_unavailable",
            Self::Cancelled => "cancelled",
            Self::DeadlineExceeded { .. } => "deadline_exceeded",
        }
    }
}

/// Vote request errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoteError {
    #[error("playerId is required")]
    MissingPlayerId,

    #[error("invalid vote type '{0}', expected 'up' or 'down'")]
    InvalidVoteType(String),

    #[error("vote storage failed: {0}")]
    Storage(String),
}

impl VoteError {
    /// Whether the caller sent a bad request (as opposed to a server fault).
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingPlayerId | Self::InvalidVoteType(_))
    }
}

/// Comment request errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommentError {
    #[error("playerId, userId, college, and message required")]
    MissingFields,

    #[error("{field} too long (max {max} chars)")]
    TooLong { field: &'static str, max: usize },

    #[error("playerId required")]
    MissingPlayerId,

    #[error("commentId and voteType required")]
    MissingVote,

    #[error("invalid vote type '{0}', expected 'up' or 'down'")]
    InvalidVoteType(String),

    #[error("comment {0} not found")]
    NotFound(String),

    #[error("comment storage failed: {0}")]
    Storage(String),
}

impl CommentError {
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::NotFound(_) | Self::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            SyncError::DeadlineExceeded {
                deadline: Duration::from_secs(120)
            }
            .to_string(),
            "sync exceeded deadline of 120s"
        );
        assert_eq!(
            SyncError::DeadlineExceeded {
                deadline: Duration::from_millis(250)
            }
            .to_string(),
            "sync exceeded deadline of 250ms"
        );
        assert_eq!(SyncError::Cancelled.outcome(), "cancelled");
        assert!(VoteError::InvalidVoteType("sideways".into()).is_client_error());
        assert!(!VoteError::Storage("disk full".into()).is_client_error());
        assert_eq!(
            CommentError::TooLong {
                field: "message",
                max: 500
            }
            .to_string(),
            "message too long (max 500 chars)"
        );
        assert!(!CommentError::NotFound("c1".into()).is_client_error());
    }
}
