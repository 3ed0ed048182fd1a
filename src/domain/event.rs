//! Activity-feed events.
//!
//! One `PortalEvent` per detected transition. Events are append-only:
//! once committed they are never updated or deleted by a sync run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::player::{PlayerId, PlayerRecord};

/// Kind of state transition an event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// First observation of a player.
    PortalEntry,
    /// Destination went from none to some.
    Commitment,
    /// NIL valuation moved by more than the relative threshold.
    NilChange,
    /// National rank moved by at least the absolute threshold.
    RankingChange,
}

impl EventKind {
    pub const ALL: [Self; 4] = [
        Self::PortalEntry,
        Self::Commitment,
        Self::NilChange,
        Self::RankingChange,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PortalEntry => "portal_entry",
            Self::Commitment => "commitment",
            Self::NilChange => "nil_change",
            Self::RankingChange => "ranking_change",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown event type: {s}"))
    }
}

/// An immutable activity-feed entry.
///
/// Player fields are denormalized from the record at detection time.
/// Type-specific fields are `None` for kinds that do not use them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub player_id: PlayerId,
    pub player_name: String,
    pub player_slug: String,
    pub player_image: Option<String>,
    pub position: Option<String>,
    pub stars: Option<u8>,
    pub rating: Option<f64>,
    pub from_school: Option<String>,
    pub from_school_logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_school: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_school_logo: Option<String>,
    pub nil_value: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_rank: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_rank: Option<u32>,
    /// Community score when the event was detected. Never updated afterwards.
    pub vote_score: i64,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

impl PortalEvent {
    fn base(
        kind: EventKind,
        player_id: &str,
        record: &PlayerRecord,
        vote_score: i64,
        description: String,
        now: DateTime<Utc>,
    ) -> Self {
        let from = record.from_school.as_ref();
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            player_id: player_id.to_string(),
            player_name: record.name.clone(),
            player_slug: record.slug.clone(),
            player_image: record.image_url.clone(),
            position: record.position.clone(),
            stars: record.stars,
            rating: record.rating,
            from_school: from.map(|s| s.name.clone()),
            from_school_logo: from.and_then(|s| s.logo_url.clone()),
            to_school: None,
            to_school_logo: None,
            nil_value: record.nil_value,
            old_value: None,
            new_value: None,
            old_rank: None,
            new_rank: None,
            vote_score,
            description,
            timestamp: now,
            read: false,
        }
    }

    /// Copy the current destination, if any, onto the event.
    fn with_destination(mut self, record: &PlayerRecord) -> Self {
        if let Some(to) = &record.to_org {
            self.to_school = Some(to.name.clone());
            self.to_school_logo = to.logo_url.clone();
        }
        self
    }

    pub fn portal_entry(
        player_id: &str,
        record: &PlayerRecord,
        vote_score: i64,
        now: DateTime<Utc>,
    ) -> Self {
        let description = format!("{} has entered the transfer portal.", record.name);
        Self::base(
            EventKind::PortalEntry,
            player_id,
            record,
            vote_score,
            description,
            now,
        )
    }

    pub fn commitment(
        player_id: &str,
        record: &PlayerRecord,
        destination: &str,
        vote_score: i64,
        now: DateTime<Utc>,
    ) -> Self {
        let description = format!("{} has committed to {destination}.", record.name);
        Self::base(
            EventKind::Commitment,
            player_id,
            record,
            vote_score,
            description,
            now,
        )
        .with_destination(record)
    }

    pub fn nil_change(
        player_id: &str,
        record: &PlayerRecord,
        old_value: u64,
        new_value: u64,
        vote_score: i64,
        now: DateTime<Utc>,
    ) -> Self {
        let direction = if new_value > old_value {
            "increased"
        } else {
            "decreased"
        };
        let description = format!(
            "{}'s NIL value {direction} to {}.",
            record.name,
            format_millions(new_value)
        );
        let mut event = Self::base(
            EventKind::NilChange,
            player_id,
            record,
            vote_score,
            description,
            now,
        )
        .with_destination(record);
        event.old_value = Some(old_value);
        event.new_value = Some(new_value);
        event
    }

    pub fn ranking_change(
        player_id: &str,
        record: &PlayerRecord,
        old_rank: u32,
        new_rank: u32,
        vote_score: i64,
        now: DateTime<Utc>,
    ) -> Self {
        // Lower number is a better rank.
        let direction = if new_rank < old_rank { "rose" } else { "dropped" };
        let description = format!("{} {direction} to #{new_rank} in rankings.", record.name);
        let mut event = Self::base(
            EventKind::RankingChange,
            player_id,
            record,
            vote_score,
            description,
            now,
        )
        .with_destination(record);
        event.old_rank = Some(old_rank);
        event.new_rank = Some(new_rank);
        event
    }

    /// Whether the rank moved to a numerically lower (better) value.
    pub fn rank_improved(&self) -> Option<bool> {
        Some(self.new_rank? < self.old_rank?)
    }
}

/// Format whole dollars as `$X.XXM`.
#[allow(clippy::cast_precision_loss)]
fn format_millions(dollars: u64) -> String {
    format!("${:.2}M", dollars as f64 / 1_000_000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::player::School;

    fn record() -> PlayerRecord {
        PlayerRecord {
            id: Some("p1".into()),
            name: "Jane Doe".into(),
            slug: "jane-doe".into(),
            from_school: Some(School::new("Oregon", Some("oregon.png".into()))),
            to_org: Some(School::new("Texas", Some("texas.png".into()))),
            nil_value: Some(1_150_000),
            ..Default::default()
        }
    }

    #[test]
    fn test_event_kind_parse_roundtrip() {
        for kind in EventKind::ALL {
            assert_eq!(kind.as_str().parse::<EventKind>().unwrap(), kind);
        }
        assert!("bogus".parse::<EventKind>().is_err());
    }

    #[test]
    fn test_portal_entry_has_no_destination() {
        let event = PortalEvent::portal_entry("p1", &record(), 3, Utc::now());
        assert_eq!(event.kind, EventKind::PortalEntry);
        assert_eq!(event.description, "Jane Doe has entered the transfer portal.");
        assert_eq!(event.from_school.as_deref(), Some("Oregon"));
        assert!(event.to_school.is_none());
        assert!(!event.read);
    }

    #[test]
    fn test_nil_change_description() {
        let event = PortalEvent::nil_change("p1", &record(), 1_000_000, 1_150_000, 0, Utc::now());
        assert_eq!(event.description, "Jane Doe's NIL value increased to $1.15M.");
        assert_eq!(event.to_school.as_deref(), Some("Texas"));

        let event = PortalEvent::nil_change("p1", &record(), 2_000_000, 1_150_000, 0, Utc::now());
        assert!(event.description.contains("decreased"));
    }

    #[test]
    fn test_ranking_change_direction() {
        let event = PortalEvent::ranking_change("p1", &record(), 20, 14, 0, Utc::now());
        assert_eq!(event.rank_improved(), Some(true));
        assert_eq!(event.description, "Jane Doe rose to #14 in rankings.");

        let event = PortalEvent::ranking_change("p1", &record(), 14, 20, 0, Utc::now());
        assert_eq!(event.rank_improved(), Some(false));
        assert!(event.description.contains("dropped"));
    }

    #[test]
    fn test_serializes_type_field() {
        let event = PortalEvent::portal_entry("p1", &record(), 0, Utc::now());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "portal_entry");
        assert_eq!(json["playerName"], "Jane Doe");
        assert!(json.get("oldRank").is_none());
    }
}
