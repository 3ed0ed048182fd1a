//! Prometheus Metrics Registry - Sync Observability
//!
//! Registers the sync, vote and comment metrics and renders them in the
//! Prometheus text format for the `/metrics` route.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

use crate::domain::event::EventKind;
use crate::domain::vote::VoteDirection;

/// Centralized Prometheus metrics for the tracker.
///
/// All metrics follow the naming convention `portal_tracker_*`.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Sync runs by outcome (ok, no_data, fetch_failed, ...).
    pub sync_runs: IntCounterVec,
    /// Events committed, by event type.
    pub events_created: IntCounterVec,
    /// Players processed by the last committed run.
    pub players_processed: IntGauge,
    /// Malformed feed records skipped.
    pub records_skipped: IntCounter,
    /// Wall time of a sync run, commit included.
    pub sync_duration_seconds: Histogram,
    /// Votes cast, by direction.
    pub votes: IntCounterVec,
    /// Comments posted.
    pub comments_posted: IntCounter,
    /// Comment votes cast, by direction.
    pub comment_votes: IntCounterVec,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let sync_runs = IntCounterVec::new(
            Opts::new("portal_tracker_sync_runs_total", "Sync runs by outcome"),
            &["outcome"],
        )?;

        let events_created = IntCounterVec::new(
            Opts::new(
                "portal_tracker_events_created_total",
                "Portal events committed by type",
            ),
            &["type"],
        )?;

        let players_processed = IntGauge::new(
            "portal_tracker_players_processed",
            "Players processed by the last committed sync",
        )?;

        let records_skipped = IntCounter::new(
            "portal_tracker_records_skipped_total",
            "Feed records skipped for a missing identifier",
        )?;

        let sync_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "portal_tracker_sync_duration_seconds",
                "Sync run duration in seconds",
            )
            .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        )?;

        let votes = IntCounterVec::new(
            Opts::new("portal_tracker_votes_total", "Votes cast by direction"),
            &["direction"],
        )?;

        let comments_posted = IntCounter::new(
            "portal_tracker_comments_posted_total",
            "Comments posted",
        )?;

        let comment_votes = IntCounterVec::new(
            Opts::new(
                "portal_tracker_comment_votes_total",
                "Comment votes cast by direction",
            ),
            &["direction"],
        )?;

        // Register all metrics
        registry.register(Box::new(sync_runs.clone()))?;
        registry.register(Box::new(events_created.clone()))?;
        registry.register(Box::new(players_processed.clone()))?;
        registry.register(Box::new(records_skipped.clone()))?;
        registry.register(Box::new(sync_duration_seconds.clone()))?;
        registry.register(Box::new(votes.clone()))?;
        registry.register(Box::new(comments_posted.clone()))?;
        registry.register(Box::new(comment_votes.clone()))?;

        // Pre-create label sets so every series exists from the first scrape.
        for kind in EventKind::ALL {
            events_created.with_label_values(&[kind.as_str()]);
        }
        for direction in [VoteDirection::Up, VoteDirection::Down] {
            votes.with_label_values(&[direction.as_str()]);
            comment_votes.with_label_values(&[direction.as_str()]);
        }

        Ok(Self {
            registry,
            sync_runs,
            events_created,
            players_processed,
            records_skipped,
            sync_duration_seconds,
            votes,
            comments_posted,
            comment_votes,
        })
    }

    /// Count a finished run by outcome label.
    pub fn record_run(&self, outcome: &str, seconds: f64) {
        self.sync_runs.with_label_values(&[outcome]).inc();
        self.sync_duration_seconds.observe(seconds);
    }

    /// Count the events of a committed run.
    pub fn record_events(&self, kinds: &[EventKind]) {
        for kind in kinds {
            self.events_created.with_label_values(&[kind.as_str()]).inc();
        }
    }

    pub fn record_vote(&self, direction: VoteDirection) {
        self.votes.with_label_values(&[direction.as_str()]).inc();
    }

    pub fn record_comment_vote(&self, direction: VoteDirection) {
        self.comment_votes.with_label_values(&[direction.as_str()]).inc();
    }

    /// Encode all metrics in the Prometheus text format.
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
