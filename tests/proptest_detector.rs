//! Property-Based Tests - Change Detector Invariants
//!
//! Uses `proptest` to verify that the detector's event rules hold
//! across random rosters, valuations and ranks.

use std::collections::HashMap;

use chrono::Utc;
use proptest::prelude::*;

use portal_tracker::domain::detector::{ChangeDetector, DetectorThresholds};
use portal_tracker::domain::event::EventKind;
use portal_tracker::domain::player::{PlayerId, PlayerRecord, PlayerSnapshot, School};

fn record(
    id: usize,
    nil_value: Option<u64>,
    national_rank: Option<u32>,
    destination: Option<String>,
) -> PlayerRecord {
    PlayerRecord {
        id: Some(format!("p{id}")),
        name: format!("Player {id}"),
        slug: format!("player-{id}"),
        nil_value,
        national_rank,
        to_org: destination.map(|name| School::new(name, None)),
        ..Default::default()
    }
}

fn previous_of(records: &[PlayerRecord]) -> HashMap<PlayerId, PlayerSnapshot> {
    let now = Utc::now();
    records
        .iter()
        .filter_map(|r| {
            let id = r.key()?;
            Some((id.to_string(), PlayerSnapshot::from_record(id, r, now)))
        })
        .collect()
}

fn roster() -> impl Strategy<Value = Vec<PlayerRecord>> {
    prop::collection::vec(
        (
            prop::option::of(1u64..50_000_000),
            prop::option::of(1u32..2_000),
            prop::option::of("[A-Z][a-z]{2,10}"),
        ),
        0..40,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (nil, rank, dest))| record(i, nil, rank, dest))
            .collect()
    })
}

// ── Portal Entry Properties ─────────────────────────────────

proptest! {
    /// A player never seen before yields exactly one portal_entry and nothing else.
    #[test]
    fn new_players_only_enter_portal(current in roster()) {
        let detection = ChangeDetector::default().detect(
            &HashMap::new(),
            &current,
            &HashMap::new(),
            Utc::now(),
        );

        prop_assert_eq!(detection.events.len(), current.len());
        prop_assert!(detection.events.iter().all(|e| e.kind == EventKind::PortalEntry));
        prop_assert_eq!(detection.next_snapshots.len(), current.len());
    }

    /// Identical input against the snapshots it produced yields no events.
    #[test]
    fn identical_second_run_is_silent(current in roster()) {
        let detector = ChangeDetector::default();
        let first = detector.detect(&HashMap::new(), &current, &HashMap::new(), Utc::now());
        let second = detector.detect(&first.next_snapshots, &current, &HashMap::new(), Utc::now());

        prop_assert!(second.events.is_empty(), "unexpected events: {:?}", second.events);
        prop_assert_eq!(second.next_snapshots.len(), current.len());
    }
}

// ── Commitment Properties ───────────────────────────────────

proptest! {
    /// None -> Some(X) yields exactly one commitment naming X.
    #[test]
    fn commitment_names_destination(
        rank in prop::option::of(1u32..500),
        nil in prop::option::of(1u64..5_000_000),
        school in "[A-Z][a-z]{2,12}",
    ) {
        let before = record(1, nil, rank, None);
        let after = record(1, nil, rank, Some(school.clone()));

        let detection = ChangeDetector::default().detect(
            &previous_of(&[before]),
            &[after],
            &HashMap::new(),
            Utc::now(),
        );

        let commitments: Vec<_> = detection
            .events
            .iter()
            .filter(|e| e.kind == EventKind::Commitment)
            .collect();
        prop_assert_eq!(commitments.len(), 1);
        prop_assert_eq!(commitments[0].to_school.as_deref(), Some(school.as_str()));
        prop_assert_eq!(detection.events.len(), 1);
    }
}

// ── NIL Threshold Properties ────────────────────────────────

proptest! {
    /// A relative change of at most 10% never emits nil_change.
    #[test]
    fn small_nil_moves_are_ignored(
        old in 10u64..100_000_000,
        fraction in 0.0f64..=1.0,
        up in any::<bool>(),
    ) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let delta = ((old / 10) as f64 * fraction) as u64;
        let new = if up { old + delta } else { old - delta };

        let detection = ChangeDetector::default().detect(
            &previous_of(&[record(1, Some(old), None, None)]),
            &[record(1, Some(new), None, None)],
            &HashMap::new(),
            Utc::now(),
        );
        prop_assert!(detection.events.is_empty());
    }

    /// A relative change above 10% always emits exactly one nil_change.
    #[test]
    fn large_nil_moves_are_reported(
        old in 10u64..100_000_000,
        extra in 1u64..1_000_000,
        up in any::<bool>(),
    ) {
        let delta = (old / 10 + extra).min(old);
        prop_assume!(delta * 10 > old);
        let new = if up { old + delta } else { old - delta };

        let detection = ChangeDetector::default().detect(
            &previous_of(&[record(1, Some(old), None, None)]),
            &[record(1, Some(new), None, None)],
            &HashMap::new(),
            Utc::now(),
        );
        prop_assert_eq!(detection.events.len(), 1);
        let event = &detection.events[0];
        prop_assert_eq!(event.kind, EventKind::NilChange);
        prop_assert_eq!(event.old_value, Some(old));
        prop_assert_eq!(event.new_value, Some(new));
        let word = if up { "increased" } else { "decreased" };
        prop_assert!(event.description.contains(word));
    }

    /// A valuation appearing from nothing is not a change.
    #[test]
    fn nil_from_unknown_is_ignored(new in 1u64..100_000_000) {
        let detection = ChangeDetector::default().detect(
            &previous_of(&[record(1, None, None, None)]),
            &[record(1, Some(new), None, None)],
            &HashMap::new(),
            Utc::now(),
        );
        prop_assert!(detection.events.is_empty());
    }
}

// ── Ranking Threshold Properties ────────────────────────────

proptest! {
    /// Rank moves of exactly 4 are ignored, exactly 5 are reported.
    #[test]
    fn rank_boundary(old in 10u32..1_000, improve in any::<bool>()) {
        let detector = ChangeDetector::new(DetectorThresholds::default());
        let shift = |d: u32| if improve { old - d } else { old + d };

        let quiet = detector.detect(
            &previous_of(&[record(1, None, Some(old), None)]),
            &[record(1, None, Some(shift(4)), None)],
            &HashMap::new(),
            Utc::now(),
        );
        prop_assert!(quiet.events.is_empty());

        let loud = detector.detect(
            &previous_of(&[record(1, None, Some(old), None)]),
            &[record(1, None, Some(shift(5)), None)],
            &HashMap::new(),
            Utc::now(),
        );
        prop_assert_eq!(loud.events.len(), 1);
        prop_assert_eq!(loud.events[0].kind, EventKind::RankingChange);
        prop_assert_eq!(loud.events[0].rank_improved(), Some(improve));
    }
}
