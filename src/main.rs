//! Portal Tracker - Entry Point
//!
//! Wires configuration, logging, storage, the portal feed and the
//! HTTP API, then runs scheduled syncs until SIGINT.
//!
//! Wiring sequence:
//! 1. Load config.toml (or the path given as first argument) + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Open the JSON document store
//! 4. Create the On3 feed, metrics and use cases
//! 5. Spawn the HTTP API
//! 6. Spawn the sync scheduler
//! 7. Wait for SIGINT, then shut down (an uncommitted sync is dropped)

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

use portal_tracker::adapters::http::{self, AppState};
use portal_tracker::adapters::metrics::MetricsRegistry;
use portal_tracker::adapters::persistence::JsonFileStore;
use portal_tracker::adapters::portal::On3Feed;
use portal_tracker::config;
use portal_tracker::domain::detector::ChangeDetector;
use portal_tracker::usecases::{CommentService, PortalSync, SyncScheduler, VoteService};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config = config::loader::load_config(&config_path)
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.app.log_level)),
        )
        .json()
        .init();

    info!(
        name = %config.app.name,
        version = env!("CARGO_PKG_VERSION"),
        season = %config.feed.season,
        interval_seconds = config.sync.interval_seconds,
        "Starting Portal Tracker"
    );

    // ── 3. Document store ───────────────────────────────────
    let store = Arc::new(
        JsonFileStore::open(&config.persistence.data_dir)
            .await
            .context("Failed to open document store")?,
    );

    // ── 4. Feed, metrics, use cases ─────────────────────────
    let feed = Arc::new(On3Feed::new(config.feed.clone()).context("Failed to create portal feed")?);
    let metrics = Arc::new(MetricsRegistry::new().context("Failed to register metrics")?);

    let sync = Arc::new(
        PortalSync::new(
            feed,
            Arc::clone(&store),
            ChangeDetector::new(config.detector.thresholds()),
            &config.sync,
        )
        .with_metrics(Arc::clone(&metrics)),
    );
    let votes = Arc::new(VoteService::new(Arc::clone(&store)).with_metrics(Arc::clone(&metrics)));
    let comments =
        Arc::new(CommentService::new(Arc::clone(&store)).with_metrics(Arc::clone(&metrics)));

    let cron_secret = std::env::var("CRON_SECRET")
        .ok()
        .filter(|secret| !secret.is_empty())
        .map(Arc::<str>::from);
    if cron_secret.is_none() {
        warn!("CRON_SECRET not set, POST /sync is unauthenticated");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── 5. HTTP API ─────────────────────────────────────────
    let state = AppState {
        store,
        sync: Arc::clone(&sync),
        votes,
        comments,
        metrics,
        cron_secret,
        shutdown: shutdown_rx.clone(),
    };
    let bind_address = config.server.bind_address.clone();
    let http_shutdown = shutdown_rx.clone();
    let http_handle = tokio::spawn(async move {
        if let Err(e) = http::serve(state, bind_address, http_shutdown).await {
            error!(error = %e, "HTTP API failed");
        }
    });

    // ── 6. Sync scheduler ───────────────────────────────────
    let scheduler = SyncScheduler::new(sync, &config.sync);
    let scheduler_handle = tokio::spawn(scheduler.run(shutdown_rx));

    info!("All tasks spawned, tracker is running");

    // ── 7. Wait for SIGINT ──────────────────────────────────
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for SIGINT, shutting down");
    } else {
        info!("SIGINT received, initiating graceful shutdown");
    }

    let _ = shutdown_tx.send(true);

    // A commit already in progress finishes; anything earlier is dropped.
    match tokio::time::timeout(Duration::from_secs(30), scheduler_handle).await {
        Ok(Ok(runs)) => info!(runs, "Scheduler stopped"),
        Ok(Err(e)) => error!(error = %e, "Scheduler task panicked"),
        Err(_) => warn!("Scheduler did not stop within 30s"),
    }

    if tokio::time::timeout(Duration::from_secs(5), http_handle).await.is_err() {
        warn!("HTTP API did not stop within 5s");
    }

    info!("Shutdown complete");
    Ok(())
}
