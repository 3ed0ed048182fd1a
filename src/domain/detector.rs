//! Portal change detection.
//!
//! Pure diff of the current feed against the last persisted snapshots.
//! No I/O: the sync use case gathers `previous` and `tallies`, calls
//! [`ChangeDetector::detect`], and commits the result as one batch.
//!
//! Rules, evaluated per player in this order:
//! 1. No previous snapshot -> `portal_entry`, nothing else for this run.
//! 2. Previous had no destination, current has one -> `commitment`.
//! 3. Both valuations known and relative change over the old value
//!    strictly exceeds the threshold -> `nil_change`.
//! 4. Both ranks known, different, and absolute delta at least the
//!    threshold -> `ranking_change`.
//!
//! Rules 2-4 are independent; one player can produce several events.
//! Every valid record yields exactly one next snapshot.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, warn};

use super::event::PortalEvent;
use super::player::{PlayerId, PlayerRecord, PlayerSnapshot};
use super::vote::VoteTally;

/// Change thresholds. Both are configurable; defaults match the
/// values the dashboard has always used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorThresholds {
    /// Strict relative NIL change, e.g. 0.10 = more than 10%.
    pub nil_change: Decimal,
    /// Minimum absolute national-rank movement.
    pub rank_change: u32,
}

impl Default for DetectorThresholds {
    fn default() -> Self {
        Self {
            nil_change: dec!(0.10),
            rank_change: 5,
        }
    }
}

/// Output of one detection pass.
#[derive(Debug, Clone, Default)]
pub struct Detection {
    /// Events in input order (per player: entry, commitment, nil, ranking).
    pub events: Vec<PortalEvent>,
    /// Replacement snapshot for every valid player in the input.
    pub next_snapshots: HashMap<PlayerId, PlayerSnapshot>,
    /// Records with a missing or blank identifier.
    pub skipped: usize,
    /// Records whose identifier already appeared earlier in the input.
    pub duplicates: usize,
}

impl Detection {
    pub fn players_processed(&self) -> usize {
        self.next_snapshots.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChangeDetector {
    thresholds: DetectorThresholds,
}

impl ChangeDetector {
    pub const fn new(thresholds: DetectorThresholds) -> Self {
        Self { thresholds }
    }

    pub const fn thresholds(&self) -> DetectorThresholds {
        self.thresholds
    }

    /// Diff `current` against `previous`.
    ///
    /// Players missing from `tallies` get a zero vote score.
    pub fn detect(
        &self,
        previous: &HashMap<PlayerId, PlayerSnapshot>,
        current: &[PlayerRecord],
        tallies: &HashMap<PlayerId, VoteTally>,
        now: DateTime<Utc>,
    ) -> Detection {
        let mut detection = Detection::default();
        let mut seen: HashSet<&str> = HashSet::with_capacity(current.len());

        for record in current {
            let Some(id) = record.key() else {
                warn!(name = %record.name, "Skipping portal record without identifier");
                detection.skipped += 1;
                continue;
            };

            if !seen.insert(id) {
                debug!(player_id = %id, "Duplicate portal record, keeping first");
                detection.duplicates += 1;
                continue;
            }

            let vote_score = tallies.get(id).map_or(0, VoteTally::score);
            let events = self.evaluate(id, previous.get(id), record, vote_score, now);
            detection.events.extend(events);
            detection
                .next_snapshots
                .insert(id.to_string(), PlayerSnapshot::from_record(id, record, now));
        }

        detection
    }

    /// Events for a single player.
    pub fn evaluate(
        &self,
        id: &str,
        previous: Option<&PlayerSnapshot>,
        record: &PlayerRecord,
        vote_score: i64,
        now: DateTime<Utc>,
    ) -> Vec<PortalEvent> {
        let Some(previous) = previous else {
            return vec![PortalEvent::portal_entry(id, record, vote_score, now)];
        };

        let mut events = Vec::new();

        if let (None, Some(destination)) = (&previous.to_school, &record.to_org) {
            events.push(PortalEvent::commitment(
                id,
                record,
                &destination.name,
                vote_score,
                now,
            ));
        }

        if let (Some(old), Some(new)) = (previous.nil_value, record.nil_value) {
            if self.nil_changed(old, new) {
                events.push(PortalEvent::nil_change(id, record, old, new, vote_score, now));
            }
        }

        if let (Some(old), Some(new)) = (previous.national_rank, record.national_rank) {
            if self.rank_changed(old, new) {
                events.push(PortalEvent::ranking_change(
                    id, record, old, new, vote_score, now,
                ));
            }
        }

        events
    }

    /// `|new - old| / old > threshold`. A zero baseline never counts.
    pub fn nil_changed(&self, old: u64, new: u64) -> bool {
        if old == 0 {
            return false;
        }
        let change = Decimal::from(old.abs_diff(new)) / Decimal::from(old);
        change > self.thresholds.nil_change
    }

    /// `old != new && |new - old| >= threshold`.
    pub const fn rank_changed(&self, old: u32, new: u32) -> bool {
        old != new && old.abs_diff(new) >= self.thresholds.rank_change
    }
}
