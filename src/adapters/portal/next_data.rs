//! `__NEXT_DATA__` extraction from rankings pages.

use anyhow::{Context, Result};
use serde_json::Value;

use super::types::NextData;

const SCRIPT_OPEN: &str = r#"<script id="__NEXT_DATA__" type="application/json">"#;
const SCRIPT_CLOSE: &str = "</script>";

/// Players per rankings page when the site omits `pageCount`.
const PAGE_SIZE: u32 = 50;

/// Parsed rankings page.
#[derive(Debug, Clone, Default)]
pub struct RankingsPage {
  /// Untyped player entries, in page order.
  pub players: Vec<Value>,
  /// Total pages the list spans (at least 1).
  pub total_pages: u32,
}

/// JSON text of the `__NEXT_DATA__` script, if present.
pub fn extract_next_data(html: &str) -> Option<&str> {
  let start = html.find(SCRIPT_OPEN)? + SCRIPT_OPEN.len();
  let len = html[start..].find(SCRIPT_CLOSE)?;
  let json = html[start..start + len].trim();
  (!json.is_empty()).then_some(json)
}

/// Parse a rankings page into its player list and page count.
///
/// # Errors
/// Returns error if the script tag is missing or its JSON is invalid.
pub fn parse_rankings_page(html: &str) -> Result<RankingsPage> {
  let json = extract_next_data(html).context("Page has no __NEXT_DATA__ script")?;
  let data: NextData = serde_json::from_str(json).context("Failed to parse __NEXT_DATA__ JSON")?;

  let player_data = data
    .props
    .and_then(|p| p.page_props)
    .and_then(|p| p.player_data)
    .unwrap_or_default();

  let pagination = player_data.pagination.unwrap_or_default();
  let total_pages = pagination
    .page_count
    .filter(|n| *n > 0)
    .unwrap_or_else(|| {
      let count = pagination.count.filter(|n| *n > 0).unwrap_or(PAGE_SIZE);
      count.div_ceil(PAGE_SIZE)
    })
    .max(1);

  Ok(RankingsPage {
    players: player_data.list,
    total_pages,
  })
}
