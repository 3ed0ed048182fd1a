//! JSON File Store - Atomic File-backed Document Store
//!
//! Persists the collections to two files using atomic writes (write
//! to tmp file, then rename):
//! - `store.json`: snapshots, events and the last-sync time. Only
//!   sync batches write it, so a committed batch is either fully on
//!   disk or not at all.
//! - `social.json`: vote tallies and comments. Fan activity rewrites
//!   this file only, never the growing event log.
//!
//! Each write still serializes its whole file, so write cost grows
//! with that file's size.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use super::collections::{SocialCollections, SyncCollections};
use crate::domain::comment::Comment;
use crate::domain::event::PortalEvent;
use crate::domain::player::PlayerSnapshot;
use crate::domain::vote::{VoteDirection, VoteTally};
use crate::ports::document_store::{DocumentStore, EventQuery, WriteBatch};

/// One JSON document on disk and its tmp sibling.
#[derive(Debug, Clone)]
struct DocumentFile {
    path: PathBuf,
    tmp_path: PathBuf,
}

impl DocumentFile {
    fn new(dir: &Path, name: &str) -> Self {
        Self {
            path: dir.join(name),
            tmp_path: dir.join(format!("{name}.tmp")),
        }
    }

    /// Serialize and atomically replace the file.
    async fn persist<T: Serialize + Sync>(&self, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)
            .with_context(|| format!("Failed to serialize {}", self.path.display()))?;

        fs::write(&self.tmp_path, &json)
            .await
            .with_context(|| format!("Failed to write {}", self.tmp_path.display()))?;

        fs::rename(&self.tmp_path, &self.path)
            .await
            .with_context(|| format!("Failed to rename onto {}", self.path.display()))?;

        Ok(())
    }
}

/// Read a document, or `T::default()` when the file does not exist.
///
/// Any other stat failure is an error: treating it as "empty" would let
/// the next write replace real data.
async fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    let exists = fs::try_exists(path)
        .await
        .with_context(|| format!("Failed to stat {}", path.display()))?;
    if !exists {
        info!(path = %path.display(), "No store file found, starting empty");
        return Ok(T::default());
    }

    let json = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Durable `DocumentStore` backed by two JSON documents.
///
/// The in-memory copy is only replaced after the rename succeeds,
/// so a failed write leaves both disk and memory untouched.
pub struct JsonFileStore {
    sync_file: DocumentFile,
    social_file: DocumentFile,
    /// Current sync data; the mutex also serializes its writers.
    sync: Mutex<SyncCollections>,
    /// Current social data; the mutex also serializes its writers.
    social: Mutex<SocialCollections>,
}

impl JsonFileStore {
    /// Open (or create) the store in the given data directory.
    ///
    /// Creates the directory if it doesn't exist. Missing files mean
    /// empty collections.
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let dir = data_dir.as_ref();
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;

        let sync_file = DocumentFile::new(dir, "store.json");
        let social_file = DocumentFile::new(dir, "social.json");

        let sync: SyncCollections = load_or_default(&sync_file.path).await?;
        let social: SocialCollections = load_or_default(&social_file.path).await?;
        info!(
            dir = %dir.display(),
            players = sync.players.len(),
            events = sync.events.len(),
            comments = social.comments.len(),
            "Document store loaded"
        );

        Ok(Self {
            sync_file,
            social_file,
            sync: Mutex::new(sync),
            social: Mutex::new(social),
        })
    }

    /// Apply `change` to a copy of the social data, persist, then publish.
    async fn update_social<R>(&self, change: impl FnOnce(&mut SocialCollections) -> R) -> Result<R> {
        let mut guard = self.social.lock().await;
        let mut next = guard.clone();
        let result = change(&mut next);
        self.social_file.persist(&next).await?;
        *guard = next;
        Ok(result)
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn get_snapshot(&self, player_id: &str) -> Result<Option<PlayerSnapshot>> {
        Ok(self.sync.lock().await.players.get(player_id).cloned())
    }

    async fn list_snapshots(&self) -> Result<Vec<PlayerSnapshot>> {
        Ok(self.sync.lock().await.players.values().cloned().collect())
    }

    async fn get_vote_tally(&self, player_id: &str) -> Result<VoteTally> {
        Ok(self.social.lock().await.tally(player_id))
    }

    #[instrument(skip(self))]
    async fn record_vote(&self, player_id: &str, direction: VoteDirection) -> Result<VoteTally> {
        self.update_social(|social| social.vote(player_id, direction))
            .await
    }

    #[instrument(skip(self, batch), fields(writes = batch.len()))]
    async fn commit(&self, batch: WriteBatch) -> Result<()> {
        let mut guard = self.sync.lock().await;
        let mut next = guard.clone();
        next.apply(batch);
        self.sync_file.persist(&next).await?;
        *guard = next;

        info!(path = %self.sync_file.path.display(), "Batch committed");
        Ok(())
    }

    async fn list_events(&self, query: &EventQuery) -> Result<Vec<PortalEvent>> {
        Ok(self.sync.lock().await.list_events(query))
    }

    async fn last_sync(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.sync.lock().await.last_sync)
    }

    #[instrument(skip(self, comment), fields(comment_id = %comment.id))]
    async fn add_comment(&self, comment: Comment) -> Result<()> {
        self.update_social(|social| social.add_comment(comment))
            .await
    }

    async fn list_comments(&self, player_id: &str, limit: usize) -> Result<Vec<Comment>> {
        Ok(self.social.lock().await.list_comments(player_id, limit))
    }

    #[instrument(skip(self))]
    async fn vote_comment(
        &self,
        comment_id: &str,
        direction: VoteDirection,
    ) -> Result<Option<VoteTally>> {
        let mut guard = self.social.lock().await;
        let mut next = guard.clone();
        let Some(tally) = next.vote_comment(comment_id, direction) else {
            return Ok(None);
        };
        self.social_file.persist(&next).await?;
        *guard = next;
        Ok(Some(tally))
    }

    /// Check that the data directory is writable.
    async fn is_healthy(&self) -> bool {
        let Some(dir) = self.sync_file.path.parent() else {
            return false;
        };
        let probe = dir.join(".health_check");
        let result = fs::write(&probe, b"ok").await;
        let _ = fs::remove_file(&probe).await;
        if let Err(e) = &result {
            warn!(error = %e, "Store directory not writable");
        }
        result.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::comment::NewComment;
    use crate::domain::player::PlayerRecord;

    fn snapshot(id: &str) -> PlayerSnapshot {
        let record = PlayerRecord {
            id: Some(id.into()),
            name: format!("Player {id}"),
            nil_value: Some(250_000),
            ..Default::default()
        };
        PlayerSnapshot::from_record(id, &record, Utc::now())
    }

    #[tokio::test]
    async fn test_commit_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc::now();

        let store = JsonFileStore::open(dir.path()).await.unwrap();
        let mut batch = WriteBatch::new();
        let snap = snapshot("p1");
        let record = PlayerRecord {
            id: Some("p1".into()),
            name: "Player p1".into(),
            ..Default::default()
        };
        batch.insert_event(PortalEvent::portal_entry("p1", &record, 0, now));
        batch.upsert_snapshot(snap.clone());
        batch.set_last_sync(now);
        store.commit(batch).await.unwrap();
        store.record_vote("p1", VoteDirection::Down).await.unwrap();

        let reopened = JsonFileStore::open(dir.path()).await.unwrap();
        assert_eq!(reopened.get_snapshot("p1").await.unwrap(), Some(snap));
        assert_eq!(reopened.list_events(&EventQuery::default()).await.unwrap().len(), 1);
        assert_eq!(reopened.get_vote_tally("p1").await.unwrap(), VoteTally::new(0, 1));
        assert_eq!(reopened.last_sync().await.unwrap(), Some(now));
        assert!(reopened.is_healthy().await);
    }

    #[tokio::test]
    async fn test_empty_directory_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("nested")).await.unwrap();
        assert!(store.get_snapshot("nobody").await.unwrap().is_none());
        assert_eq!(store.get_vote_tally("nobody").await.unwrap(), VoteTally::default());
        assert!(store.last_sync().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fan_activity_leaves_event_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();

        let mut batch = WriteBatch::new();
        batch.upsert_snapshot(snapshot("p1"));
        batch.set_last_sync(Utc::now());
        store.commit(batch).await.unwrap();
        let before = std::fs::read(dir.path().join("store.json")).unwrap();

        store.record_vote("p1", VoteDirection::Up).await.unwrap();
        let comment = NewComment {
            player_id: Some("p1".into()),
            user_id: Some("fan".into()),
            college: Some("Oregon".into()),
            message: Some("Welcome".into()),
            ..Default::default()
        }
        .validate(Utc::now())
        .unwrap();
        let id = comment.id.clone();
        store.add_comment(comment).await.unwrap();
        store.vote_comment(&id, VoteDirection::Up).await.unwrap();
        assert!(store.vote_comment("missing", VoteDirection::Up).await.unwrap().is_none());

        assert_eq!(std::fs::read(dir.path().join("store.json")).unwrap(), before);

        let reopened = JsonFileStore::open(dir.path()).await.unwrap();
        let comments = reopened.list_comments("p1", 50).await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].votes, VoteTally::new(1, 0));
        assert_eq!(reopened.get_vote_tally("p1").await.unwrap(), VoteTally::new(1, 0));
    }

    #[tokio::test]
    async fn test_unreadable_path_is_an_error_not_an_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain-file");
        std::fs::write(&file, b"not a directory").unwrap();

        let result = load_or_default::<SyncCollections>(&file.join("store.json")).await;
        assert!(result.is_err());

        let missing = load_or_default::<SyncCollections>(&dir.path().join("store.json"))
            .await
            .unwrap();
        assert!(missing.players.is_empty());
    }
}
