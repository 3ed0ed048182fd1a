//! Raw On3 page payload types.
//!
//! Mirrors the subset of the `__NEXT_DATA__` JSON the tracker reads.
//! Every field is optional: the site omits or nulls fields freely.
//! Player fields go through [`lenient`], so a field of the wrong shape
//! reads as absent instead of failing the whole entry.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize an optional field, mapping a type mismatch to `None`.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  let value = Value::deserialize(deserializer)?;
  Ok(T::deserialize(value).ok())
}

/// Root of the `__NEXT_DATA__` document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NextData {
  pub props: Option<Props>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Props {
  pub page_props: Option<PageProps>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageProps {
  pub player_data: Option<PlayerData>,
}

/// One page of the rankings list.
///
/// Players stay untyped here so a single odd entry can be
/// rejected on its own instead of failing the whole page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlayerData {
  pub list: Vec<Value>,
  pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Pagination {
  pub page_count: Option<u32>,
  pub count: Option<u32>,
}

/// One player entry of the rankings list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawPlayer {
  /// Numeric on the live site; accepted as any scalar.
  pub key: Option<Value>,
  #[serde(deserialize_with = "lenient")]
  pub name: Option<String>,
  #[serde(deserialize_with = "lenient")]
  pub slug: Option<String>,
  #[serde(deserialize_with = "lenient")]
  pub default_asset_url: Option<String>,
  #[serde(deserialize_with = "lenient")]
  pub position_abbreviation: Option<String>,
  #[serde(deserialize_with = "lenient")]
  pub last_team: Option<RawTeam>,
  #[serde(deserialize_with = "lenient")]
  pub commit_status: Option<RawCommitStatus>,
  #[serde(deserialize_with = "lenient")]
  pub rec_status: Option<String>,
  #[serde(deserialize_with = "lenient")]
  pub valuation: Option<RawValuation>,
  /// Rating slots are read leniently: only objects count.
  pub transfer_rating: Option<Value>,
  pub roster_rating: Option<Value>,
  pub rating: Option<Value>,
}

impl RawPlayer {
  /// First rating block present, in `transferRating`, `rosterRating`,
  /// `rating` order.
  pub fn rating_block(&self) -> RawRating {
    [&self.transfer_rating, &self.roster_rating, &self.rating]
      .into_iter()
      .flatten()
      .filter(|v| v.is_object())
      .find_map(|v| RawRating::deserialize(v).ok())
      .unwrap_or_default()
  }
}

/// Origin team. Its logo sits under `assetUrl.url`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawTeam {
  #[serde(deserialize_with = "lenient")]
  pub name: Option<String>,
  #[serde(deserialize_with = "lenient")]
  pub full_name: Option<String>,
  #[serde(deserialize_with = "lenient")]
  pub asset_url: Option<RawAsset>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawAsset {
  #[serde(deserialize_with = "lenient")]
  pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawCommitStatus {
  #[serde(deserialize_with = "lenient")]
  pub committed_organization: Option<RawOrganization>,
}

/// Destination organization. Its logo is a plain string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawOrganization {
  #[serde(deserialize_with = "lenient")]
  pub name: Option<String>,
  #[serde(deserialize_with = "lenient")]
  pub full_name: Option<String>,
  #[serde(deserialize_with = "lenient")]
  pub asset_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawValuation {
  #[serde(deserialize_with = "lenient")]
  pub total_value: Option<f64>,
}

/// Rating block; consensus values win over single-service ones.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawRating {
  #[serde(deserialize_with = "lenient")]
  pub consensus_rating: Option<f64>,
  #[serde(deserialize_with = "lenient")]
  pub rating: Option<f64>,
  #[serde(deserialize_with = "lenient")]
  pub consensus_stars: Option<f64>,
  #[serde(deserialize_with = "lenient")]
  pub stars: Option<f64>,
  #[serde(deserialize_with = "lenient")]
  pub consensus_national_rank: Option<f64>,
  #[serde(deserialize_with = "lenient")]
  pub national_rank: Option<f64>,
}
