//! Configuration Module - TOML-based Service Configuration
//!
//! Loads and validates configuration from `config.toml`. Detector
//! thresholds, feed endpoints and scheduling all live here; nothing
//! tunable is hardcoded in the domain layer. Secrets (the cron
//! bearer token) come from the environment, never from the file.

pub mod loader;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::domain::detector::DetectorThresholds;

/// Top-level service configuration.
///
/// Loaded from `config.toml` at startup. Every section has defaults,
/// so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  /// Service identity and logging.
  pub app: AppSection,
  /// Change detection thresholds.
  pub detector: DetectorConfig,
  /// Transfer-portal source.
  pub feed: FeedConfig,
  /// Sync scheduling and run limits.
  pub sync: SyncConfig,
  /// Persistence configuration.
  pub persistence: PersistenceConfig,
  /// HTTP API server.
  pub server: ServerConfig,
}

/// Service identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
  /// Human-readable service name.
  #[serde(default = "default_name")]
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
}

impl Default for AppSection {
  fn default() -> Self {
    Self {
      name: default_name(),
      log_level: default_log_level(),
    }
  }
}

/// Change detection thresholds.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectorConfig {
  /// Strict relative NIL change that emits an event (0.10 = >10%).
  #[serde(default = "default_nil_change_threshold")]
  pub nil_change_threshold: Decimal,
  /// Absolute national-rank movement that emits an event.
  #[serde(default = "default_rank_change_threshold")]
  pub rank_change_threshold: u32,
}

impl Default for DetectorConfig {
  fn default() -> Self {
    Self {
      nil_change_threshold: default_nil_change_threshold(),
      rank_change_threshold: default_rank_change_threshold(),
    }
  }
}

impl DetectorConfig {
  pub const fn thresholds(&self) -> DetectorThresholds {
    DetectorThresholds {
      nil_change: self.nil_change_threshold,
      rank_change: self.rank_change_threshold,
    }
  }
}

/// Transfer-portal rankings source.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
  /// Rankings base URL; `/{sport}/{season}/` is appended.
  #[serde(default = "default_feed_url")]
  pub base_url: String,
  #[serde(default = "default_sport")]
  pub sport: String,
  /// Season tried first.
  #[serde(default = "default_season")]
  pub season: String,
  /// Seasons tried in order when the primary season has no data.
  #[serde(default = "default_fallback_seasons")]
  pub fallback_seasons: Vec<String>,
  /// Request timeout in seconds.
  #[serde(default = "default_timeout")]
  pub timeout_seconds: u64,
  /// Maximum rankings pages fetched at once.
  #[serde(default = "default_concurrent_pages")]
  pub max_concurrent_pages: usize,
}

impl Default for FeedConfig {
  fn default() -> Self {
    Self {
      base_url: default_feed_url(),
      sport: default_sport(),
      season: default_season(),
      fallback_seasons: default_fallback_seasons(),
      timeout_seconds: default_timeout(),
      max_concurrent_pages: default_concurrent_pages(),
    }
  }
}

impl FeedConfig {
  /// Primary season followed by the fallbacks, without repeats.
  pub fn seasons(&self) -> Vec<String> {
    let mut seasons = vec![self.season.clone()];
    for season in &self.fallback_seasons {
      if !seasons.contains(season) {
        seasons.push(season.clone());
      }
    }
    seasons
  }
}

/// Sync scheduling configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
  /// Seconds between scheduled runs. 0 disables the scheduler.
  #[serde(default = "default_interval")]
  pub interval_seconds: u64,
  /// Run once immediately at startup.
  #[serde(default = "default_true")]
  pub run_on_startup: bool,
  /// Overall deadline for fetch + lookups + detection.
  #[serde(default = "default_deadline")]
  pub deadline_seconds: u64,
  /// Maximum concurrent per-player store lookups.
  #[serde(default = "default_lookup_concurrency")]
  pub lookup_concurrency: usize,
}

impl Default for SyncConfig {
  fn default() -> Self {
    Self {
      interval_seconds: default_interval(),
      run_on_startup: default_true(),
      deadline_seconds: default_deadline(),
      lookup_concurrency: default_lookup_concurrency(),
    }
  }
}

/// Persistence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
  /// Directory holding store.json.
  #[serde(default = "default_data_dir")]
  pub data_dir: String,
}

impl Default for PersistenceConfig {
  fn default() -> Self {
    Self {
      data_dir: default_data_dir(),
    }
  }
}

/// HTTP API server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_bind_address")]
  pub bind_address: String,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      bind_address: default_bind_address(),
    }
  }
}

// Default value functions for serde

fn default_name() -> String {
  "portal-tracker".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

const fn default_true() -> bool {
  true
}

fn default_nil_change_threshold() -> Decimal {
  dec!(0.10)
}

const fn default_rank_change_threshold() -> u32 {
  5
}

fn default_feed_url() -> String {
  "https://www.on3.com/transfer-portal/rankings".to_string()
}

fn default_sport() -> String {
  "football".to_string()
}

fn default_season() -> String {
  "2026".to_string()
}

fn default_fallback_seasons() -> Vec<String> {
  vec!["2025".to_string(), "2024".to_string()]
}

const fn default_timeout() -> u64 {
  30
}

const fn default_concurrent_pages() -> usize {
  8
}

const fn default_interval() -> u64 {
  900
}

const fn default_deadline() -> u64 {
  120
}

const fn default_lookup_concurrency() -> usize {
  16
}

fn default_data_dir() -> String {
  "data".to_string()
}

fn default_bind_address() -> String {
  "0.0.0.0:8080".to_string()
}
