//! In-memory collection layout shared by the store adapters.
//!
//! Split in two: [`SyncCollections`] is only written by sync batches,
//! [`SocialCollections`] only by fan activity (votes and comments).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::comment::Comment;
use crate::domain::event::PortalEvent;
use crate::domain::player::{PlayerId, PlayerSnapshot};
use crate::domain::vote::{VoteDirection, VoteTally};
use crate::ports::document_store::{EventQuery, WriteBatch};

/// Every collection of the document store.
#[derive(Debug, Clone, Default)]
pub struct Collections {
    pub sync: SyncCollections,
    pub social: SocialCollections,
}

/// Snapshots, the event log and the last-sync time.
///
/// Events are kept in insertion order; listings walk it backwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCollections {
    #[serde(default)]
    pub players: HashMap<PlayerId, PlayerSnapshot>,
    #[serde(default)]
    pub events: Vec<PortalEvent>,
    #[serde(default)]
    pub last_sync: Option<DateTime<Utc>>,
}

/// Player vote tallies and comments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialCollections {
    #[serde(default)]
    pub votes: HashMap<PlayerId, VoteTally>,
    /// Insertion order.
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl SyncCollections {
    /// Apply a whole batch. Snapshots overwrite, events append.
    pub fn apply(&mut self, batch: WriteBatch) {
        let (snapshots, events, last_sync) = batch.into_parts();
        for snapshot in snapshots {
            self.players.insert(snapshot.id.clone(), snapshot);
        }
        self.events.extend(events);
        if last_sync.is_some() {
            self.last_sync = last_sync;
        }
    }

    /// Newest first; among equal timestamps the later insert comes first.
    pub fn list_events(&self, query: &EventQuery) -> Vec<PortalEvent> {
        let mut events: Vec<PortalEvent> = self
            .events
            .iter()
            .rev()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();
        // Stable sort keeps the reversed insertion order for ties.
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        events.truncate(query.limit);
        events
    }
}

impl SocialCollections {
    pub fn tally(&self, player_id: &str) -> VoteTally {
        self.votes.get(player_id).copied().unwrap_or_default()
    }

    pub fn vote(&mut self, player_id: &str, direction: VoteDirection) -> VoteTally {
        let tally = self.tally(player_id).with_vote(direction);
        self.votes.insert(player_id.to_string(), tally);
        tally
    }

    pub fn add_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
    }

    /// Same ordering rule as event listings.
    pub fn list_comments(&self, player_id: &str, limit: usize) -> Vec<Comment> {
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .rev()
            .filter(|c| c.player_id == player_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        comments.truncate(limit);
        comments
    }

    pub fn vote_comment(&mut self, comment_id: &str, direction: VoteDirection) -> Option<VoteTally> {
        let comment = self.comments.iter_mut().find(|c| c.id == comment_id)?;
        comment.votes = comment.votes.with_vote(direction);
        Some(comment.votes)
    }
}
