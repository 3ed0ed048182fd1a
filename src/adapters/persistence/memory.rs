//! Memory Store - Process-local Document Store
//!
//! Keeps every collection behind one `RwLock`. A batch is applied
//! under a single write guard, so readers see all of it or none.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use super::collections::Collections;
use crate::domain::comment::Comment;
use crate::domain::event::PortalEvent;
use crate::domain::player::PlayerSnapshot;
use crate::domain::vote::{VoteDirection, VoteTally};
use crate::ports::document_store::{DocumentStore, EventQuery, WriteBatch};

/// Non-durable `DocumentStore`, used for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a snapshot directly, bypassing batches.
    pub async fn seed_snapshot(&self, snapshot: PlayerSnapshot) {
        let mut guard = self.collections.write().await;
        guard.sync.players.insert(snapshot.id.clone(), snapshot);
    }

    /// Number of stored events.
    pub async fn event_count(&self) -> usize {
        self.collections.read().await.sync.events.len()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_snapshot(&self, player_id: &str) -> Result<Option<PlayerSnapshot>> {
        Ok(self.collections.read().await.sync.players.get(player_id).cloned())
    }

    async fn list_snapshots(&self) -> Result<Vec<PlayerSnapshot>> {
        Ok(self.collections.read().await.sync.players.values().cloned().collect())
    }

    async fn get_vote_tally(&self, player_id: &str) -> Result<VoteTally> {
        Ok(self.collections.read().await.social.tally(player_id))
    }

    async fn record_vote(&self, player_id: &str, direction: VoteDirection) -> Result<VoteTally> {
        Ok(self.collections.write().await.social.vote(player_id, direction))
    }

    async fn commit(&self, batch: WriteBatch) -> Result<()> {
        let writes = batch.len();
        self.collections.write().await.sync.apply(batch);
        debug!(writes, "Memory batch committed");
        Ok(())
    }

    async fn list_events(&self, query: &EventQuery) -> Result<Vec<PortalEvent>> {
        Ok(self.collections.read().await.sync.list_events(query))
    }

    async fn last_sync(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.collections.read().await.sync.last_sync)
    }

    async fn add_comment(&self, comment: Comment) -> Result<()> {
        self.collections.write().await.social.add_comment(comment);
        Ok(())
    }

    async fn list_comments(&self, player_id: &str, limit: usize) -> Result<Vec<Comment>> {
        Ok(self.collections.read().await.social.list_comments(player_id, limit))
    }

    async fn vote_comment(
        &self,
        comment_id: &str,
        direction: VoteDirection,
    ) -> Result<Option<VoteTally>> {
        Ok(self
            .collections
            .write()
            .await
            .social
            .vote_comment(comment_id, direction))
    }

    async fn is_healthy(&self) -> bool {
        true
    }
}
