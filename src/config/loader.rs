//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tracing::info;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    season = %config.feed.season,
    nil_threshold = %config.detector.nil_change_threshold,
    rank_threshold = config.detector.rank_change_threshold,
    interval_seconds = config.sync.interval_seconds,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration from TOML text.
///
/// # Errors
/// Returns error on invalid TOML or failed validation.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig = toml::from_str(content).context("Failed to parse config.toml")?;
  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Positive detector thresholds
/// - Non-empty feed URL, sport and season
/// - Positive timeouts, deadline and concurrency limits
fn validate_config(config: &AppConfig) -> Result<()> {
  // Detector validation
  anyhow::ensure!(
    config.detector.nil_change_threshold > Decimal::ZERO,
    "nil_change_threshold must be positive, got {}",
    config.detector.nil_change_threshold
  );
  anyhow::ensure!(
    config.detector.rank_change_threshold > 0,
    "rank_change_threshold must be positive"
  );

  // Feed validation
  anyhow::ensure!(!config.feed.base_url.is_empty(), "Feed base_url must not be empty");
  anyhow::ensure!(!config.feed.sport.is_empty(), "Feed sport must not be empty");
  anyhow::ensure!(!config.feed.season.is_empty(), "Feed season must not be empty");
  anyhow::ensure!(
    config.feed.timeout_seconds > 0,
    "Feed timeout_seconds must be positive"
  );
  anyhow::ensure!(
    config.feed.max_concurrent_pages > 0,
    "max_concurrent_pages must be positive"
  );

  // Sync validation
  anyhow::ensure!(
    config.sync.deadline_seconds > 0,
    "Sync deadline_seconds must be positive"
  );
  anyhow::ensure!(
    config.sync.lookup_concurrency > 0,
    "lookup_concurrency must be positive"
  );

  // Server validation
  anyhow::ensure!(
    !config.server.bind_address.is_empty(),
    "Server bind_address must not be empty"
  );

  Ok(())
}
