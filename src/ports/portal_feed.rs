//! Portal Feed Port - Snapshot Fetcher Interface
//!
//! Supplies the full list of players currently in the transfer portal.
//! How the list is obtained (scraping, API, fixture) is an adapter
//! concern; the sync use case only sees plain records.

use async_trait::async_trait;

use crate::domain::player::PlayerRecord;

/// Trait for transfer-portal data sources.
#[async_trait]
pub trait PortalFeed: Send + Sync + 'static {
  /// Fetch every player currently listed.
  ///
  /// An empty list is a valid answer meaning "no data available".
  ///
  /// # Errors
  /// Returns error when the source cannot be reached or parsed at all.
  async fn fetch_players(&self) -> anyhow::Result<Vec<PlayerRecord>>;

  /// Human-readable source name for logs.
  fn source_name(&self) -> &'static str;
}
