//! Raw On3 player JSON -> `PlayerRecord`.
//!
//! Zero or negative numbers are treated as unknown, as are empty
//! strings and fields of the wrong shape. Only an entry that is not an
//! object at all becomes a key-less record, which the detector counts
//! as malformed.

use serde_json::Value;
use tracing::warn;

use super::types::{RawOrganization, RawPlayer, RawTeam};
use crate::domain::player::{PlayerRecord, School};

/// Convert one list entry.
pub fn to_record(value: &Value) -> PlayerRecord {
  match serde_json::from_value::<RawPlayer>(value.clone()) {
    Ok(raw) => from_raw(&raw),
    Err(e) => {
      warn!(error = %e, "Unparsable portal entry");
      PlayerRecord {
        id: None,
        name: value
          .get("name")
          .and_then(Value::as_str)
          .unwrap_or_default()
          .to_string(),
        ..Default::default()
      }
    }
  }
}

/// Convert a typed raw player.
pub fn from_raw(raw: &RawPlayer) -> PlayerRecord {
  let rating = raw.rating_block();

  PlayerRecord {
    id: raw.key.as_ref().and_then(key_string),
    name: raw.name.clone().unwrap_or_else(|| "Unknown".to_string()),
    slug: raw.slug.clone().unwrap_or_default(),
    image_url: non_empty(raw.default_asset_url.as_deref()),
    position: non_empty(raw.position_abbreviation.as_deref()),
    from_school: raw.last_team.as_ref().and_then(team_school),
    to_org: raw
      .commit_status
      .as_ref()
      .and_then(|c| c.committed_organization.as_ref())
      .and_then(org_school),
    nil_value: raw
      .valuation
      .and_then(|v| positive(v.total_value))
      .map(to_u64),
    rating: positive(rating.consensus_rating).or_else(|| positive(rating.rating)),
    stars: positive(rating.consensus_stars)
      .or_else(|| positive(rating.stars))
      .map(to_stars),
    national_rank: positive(rating.consensus_national_rank)
      .or_else(|| positive(rating.national_rank))
      .map(to_u32),
    status_label: non_empty(raw.rec_status.as_deref()),
  }
}

fn key_string(key: &Value) -> Option<String> {
  match key {
    Value::Number(n) => Some(n.to_string()),
    Value::String(s) => non_empty(Some(s.as_str())),
    _ => None,
  }
}

fn team_school(team: &RawTeam) -> Option<School> {
  let name = non_empty(team.name.as_deref()).or_else(|| non_empty(team.full_name.as_deref()))?;
  let logo = team
    .asset_url
    .as_ref()
    .and_then(|a| non_empty(a.url.as_deref()));
  Some(School::new(name, logo))
}

fn org_school(org: &RawOrganization) -> Option<School> {
  let name = non_empty(org.name.as_deref()).or_else(|| non_empty(org.full_name.as_deref()))?;
  Some(School::new(name, non_empty(org.asset_url.as_deref())))
}

fn non_empty(value: Option<&str>) -> Option<String> {
  value
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_string)
}

fn positive(value: Option<f64>) -> Option<f64> {
  value.filter(|v| v.is_finite() && *v > 0.0)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_u64(value: f64) -> u64 {
  value.round() as u64
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_u32(value: f64) -> u32 {
  value.round() as u32
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_stars(value: f64) -> u8 {
  value.round().min(5.0) as u8
}
