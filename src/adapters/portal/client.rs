//! On3 Rankings Client - Transfer-portal Scraper
//!
//! Fetches the rankings pages for a season, extracts the embedded
//! `__NEXT_DATA__` payload, and maps every entry to a `PlayerRecord`.
//! Pages after the first are fetched concurrently; a page that fails
//! contributes nothing instead of failing the whole fetch.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::next_data::{RankingsPage, parse_rankings_page};
use super::transform;
use crate::config::FeedConfig;
use crate::domain::player::PlayerRecord;
use crate::ports::portal_feed::PortalFeed;

/// Hard cap on pages per season, whatever the site claims.
const MAX_PAGES: u32 = 200;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
  AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const BROWSER_ACCEPT: &str =
  "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// `PortalFeed` backed by the On3 transfer-portal rankings site.
pub struct On3Feed {
  /// Underlying HTTP client with browser-like default headers.
  http: Client,
  /// Feed configuration.
  config: FeedConfig,
}

impl On3Feed {
  /// Create a new feed client.
  pub fn new(config: FeedConfig) -> Result<Self> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    let http = Client::builder()
      .default_headers(headers)
      .timeout(Duration::from_secs(config.timeout_seconds))
      .pool_max_idle_per_host(config.max_concurrent_pages)
      .build()
      .context("Failed to build HTTP client")?;

    Ok(Self { http, config })
  }

  /// URL of one rankings page. Page 1 has no query string.
  pub fn page_url(&self, season: &str, page: u32) -> String {
    let base = self.config.base_url.trim_end_matches('/');
    let sport = &self.config.sport;
    if page <= 1 {
      format!("{base}/{sport}/{season}/")
    } else {
      format!("{base}/{sport}/{season}/?page={page}")
    }
  }

  /// Fetch and parse one page.
  async fn fetch_page(&self, url: &str) -> Result<RankingsPage> {
    let response = self
      .http
      .get(url)
      .send()
      .await
      .with_context(|| format!("Request to {url} failed"))?;

    let status = response.status();
    anyhow::ensure!(status.is_success(), "Rankings page {url} returned {status}");

    let html = response
      .text()
      .await
      .with_context(|| format!("Failed to read body of {url}"))?;

    parse_rankings_page(&html)
  }

  /// All raw entries of one season, page order preserved.
  ///
  /// `Ok(None)` means the season has no players.
  #[instrument(skip(self))]
  async fn fetch_season(&self, season: &str) -> Result<Option<Vec<Value>>> {
    let first = self.fetch_page(&self.page_url(season, 1)).await?;
    if first.players.is_empty() {
      debug!(season, "Season has no players");
      return Ok(None);
    }

    let total_pages = first.total_pages.min(MAX_PAGES);
    info!(
      season,
      first_page = first.players.len(),
      total_pages,
      "Fetched first rankings page"
    );

    let mut players = first.players;
    if total_pages > 1 {
      let rest: Vec<Vec<Value>> = stream::iter(2..=total_pages)
        .map(|page| async move {
          let url = self.page_url(season, page);
          match self.fetch_page(&url).await {
            Ok(parsed) => parsed.players,
            Err(e) => {
              warn!(page, error = %e, "Rankings page failed, skipping");
              Vec::new()
            }
          }
        })
        .buffered(self.config.max_concurrent_pages)
        .collect()
        .await;
      players.extend(rest.into_iter().flatten());
    }

    Ok(Some(players))
  }
}

#[async_trait]
impl PortalFeed for On3Feed {
  #[instrument(skip(self), fields(sport = %self.config.sport))]
  async fn fetch_players(&self) -> Result<Vec<PlayerRecord>> {
    let mut last_error = None;
    let mut reachable = false;

    for season in self.config.seasons() {
      match self.fetch_season(&season).await {
        Ok(Some(raw)) => {
          let records: Vec<PlayerRecord> = raw.iter().map(transform::to_record).collect();
          info!(season = %season, players = records.len(), "Portal players loaded");
          return Ok(records);
        }
        Ok(None) => reachable = true,
        Err(e) => {
          warn!(season = %season, error = %e, "Season fetch failed");
          last_error = Some(e);
        }
      }
    }

    match last_error {
      Some(e) if !reachable => Err(e.context("Transfer portal fetch failed for every season")),
      _ => {
        warn!("Transfer portal returned no players");
        Ok(Vec::new())
      }
    }
  }

  fn source_name(&self) -> &'static str {
    "on3"
  }
}
