//! HTTP API Adapter - axum 0.7
//!
//! Routes:
//! - `/live`, `/ready`: liveness and readiness probes
//! - `GET /events`: activity feed, newest first
//! - `GET /votes/:player_id`, `POST /votes`: community votes
//! - `GET /comments?playerId=`, `POST /comments`, `POST /comment-votes`:
//!   fan comments, replies and comment votes
//! - `GET /players`: roster search, filter and sort
//! - `GET /schools`: schools seen in stored snapshots
//! - `POST /sync`, `GET /sync/status`: sync trigger and last run time
//! - `GET /metrics`: Prometheus exposition

pub mod auth;
pub mod error;
pub mod handlers;
pub mod state;

use axum::Router;
use axum::routing::{get, post};
use tokio::sync::watch;
use tracing::{info, instrument};

pub use error::HttpError;
pub use state::AppState;

use crate::ports::document_store::DocumentStore;
use crate::ports::portal_feed::PortalFeed;
use crate::usecases::sync::cancelled;

pub fn build_router<F: PortalFeed, S: DocumentStore>(state: AppState<F, S>) -> Router {
    Router::new()
        .route("/live", get(handlers::liveness))
        .route("/ready", get(handlers::readiness::<F, S>))
        .route("/events", get(handlers::list_events::<F, S>))
        .route("/votes", post(handlers::cast_vote::<F, S>))
        .route("/votes/:player_id", get(handlers::get_votes::<F, S>))
        .route(
            "/comments",
            get(handlers::list_comments::<F, S>).post(handlers::post_comment::<F, S>),
        )
        .route("/comment-votes", post(handlers::vote_comment::<F, S>))
        .route("/players", get(handlers::list_players::<F, S>))
        .route("/schools", get(handlers::list_schools::<F, S>))
        .route("/sync", post(handlers::trigger_sync::<F, S>))
        .route("/sync/status", get(handlers::sync_status::<F, S>))
        .route("/metrics", get(handlers::metrics::<F, S>))
        .with_state(state)
}

/// Serve the API until `shutdown` reads `true`.
#[instrument(skip(state, shutdown))]
pub async fn serve<F: PortalFeed, S: DocumentStore>(
    state: AppState<F, S>,
    bind_address: String,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, "HTTP API started");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancelled(&mut shutdown).await;
        })
        .await?;

    info!("HTTP API stopped");
    Ok(())
}
