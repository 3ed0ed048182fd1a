//! Transfer-portal player types.
//!
//! `PlayerRecord` is what the portal feed hands us on every run.
//! `PlayerSnapshot` is the last-known persisted state of one player and
//! the baseline the change detector compares against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable player identifier (the feed's numeric key, stringified).
pub type PlayerId = String;

/// Status label used when the feed gives no `recStatus` and a destination exists.
pub const STATUS_COMMITTED: &str = "Committed";

/// Status label used when the feed gives no `recStatus` and no destination exists.
pub const STATUS_IN_PORTAL: &str = "In Portal";

/// A school or organization with its logo.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct School {
    pub name: String,
    pub logo_url: Option<String>,
}

impl School {
    pub fn new(name: impl Into<String>, logo_url: Option<String>) -> Self {
        Self {
            name: name.into(),
            logo_url,
        }
    }
}

/// One player as reported by the portal feed on the current run.
///
/// `id` is optional at this boundary: records the feed could not key
/// are skipped by the detector and counted as malformed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub id: Option<PlayerId>,
    pub name: String,
    pub slug: String,
    pub image_url: Option<String>,
    pub position: Option<String>,
    pub from_school: Option<School>,
    /// Destination organization; `None` while the player is uncommitted.
    pub to_org: Option<School>,
    /// Estimated NIL valuation in whole US dollars.
    pub nil_value: Option<u64>,
    pub rating: Option<f64>,
    pub stars: Option<u8>,
    pub national_rank: Option<u32>,
    /// Raw status label from the feed, if it sent one.
    pub status_label: Option<String>,
}

impl PlayerRecord {
    /// Identifier with surrounding whitespace removed, or `None` if blank.
    pub fn key(&self) -> Option<&str> {
        self.id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Status label, falling back to "Committed" / "In Portal".
    pub fn status(&self) -> String {
        match self.status_label.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() => label.to_string(),
            _ if self.to_org.is_some() => STATUS_COMMITTED.to_string(),
            _ => STATUS_IN_PORTAL.to_string(),
        }
    }
}

/// Last persisted state of a player, keyed by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub slug: String,
    pub image_url: Option<String>,
    pub position: Option<String>,
    pub from_school: Option<School>,
    pub to_school: Option<School>,
    pub status: String,
    pub nil_value: Option<u64>,
    pub rating: Option<f64>,
    pub stars: Option<u8>,
    pub national_rank: Option<u32>,
    pub last_updated: DateTime<Utc>,
}

impl PlayerSnapshot {
    /// Build the snapshot that replaces whatever is stored for this player.
    ///
    /// Every field comes from the current record, absent values included.
    pub fn from_record(id: &str, record: &PlayerRecord, now: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            name: record.name.clone(),
            slug: record.slug.clone(),
            image_url: record.image_url.clone(),
            position: record.position.clone(),
            from_school: record.from_school.clone(),
            to_school: record.to_org.clone(),
            status: record.status(),
            nil_value: record.nil_value,
            rating: record.rating,
            stars: record.stars,
            national_rank: record.national_rank,
            last_updated: now,
        }
    }

    pub fn is_committed(&self) -> bool {
        self.to_school.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_falls_back_on_destination() {
        let mut record = PlayerRecord {
            id: Some("1".into()),
            ..Default::default()
        };
        assert_eq!(record.status(), STATUS_IN_PORTAL);

        record.to_org = Some(School::new("Texas", None));
        assert_eq!(record.status(), STATUS_COMMITTED);

        record.status_label = Some("Signed".into());
        assert_eq!(record.status(), "Signed");
    }

    #[test]
    fn test_blank_key_is_missing() {
        let record = PlayerRecord {
            id: Some("   ".into()),
            ..Default::default()
        };
        assert!(record.key().is_none());
        assert!(PlayerRecord::default().key().is_none());
    }

    #[test]
    fn test_snapshot_overwrites_with_absent_values() {
        let record = PlayerRecord {
            id: Some("p9".into()),
            name: "Sam Roe".into(),
            nil_value: None,
            ..Default::default()
        };
        let snapshot = PlayerSnapshot::from_record("p9", &record, Utc::now());
        assert_eq!(snapshot.id, "p9");
        assert!(snapshot.nil_value.is_none());
        assert!(!snapshot.is_committed());
    }
}
