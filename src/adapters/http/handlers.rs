//! Route handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::auth::authorize;
use super::error::HttpError;
use super::state::AppState;
use crate::domain::comment::{Comment, NewComment};
use crate::domain::event::{EventKind, PortalEvent};
use crate::domain::player::{PlayerSnapshot, School};
use crate::domain::roster::{RosterQuery, unique_positions, unique_schools};
use crate::domain::vote::VoteTally;
use crate::ports::document_store::{DocumentStore, EventQuery};
use crate::ports::portal_feed::PortalFeed;

#[derive(Debug, Default, Deserialize)]
pub struct EventsParams {
    /// Event kind, or `all`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EventsResponse {
    pub events: Vec<PortalEvent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub player_id: Option<String>,
    pub vote_type: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResponse {
    pub upvotes: u64,
    pub downvotes: u64,
    pub score: i64,
}

impl From<VoteTally> for VoteResponse {
    fn from(tally: VoteTally) -> Self {
        Self {
            upvotes: tally.upvotes,
            downvotes: tally.downvotes,
            score: tally.score(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentsParams {
    pub player_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentVoteRequest {
    pub comment_id: Option<String>,
    pub vote_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SchoolsResponse {
    pub schools: Vec<School>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlayersResponse {
    pub players: Vec<PlayerSnapshot>,
    /// Positions across the whole stored roster, for filter menus.
    pub positions: Vec<String>,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub message: String,
    pub players_processed: usize,
    pub events_created: usize,
    pub skipped_records: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusResponse {
    pub last_sync: Option<DateTime<Utc>>,
}

/// Liveness probe: always returns 200 if the process is running.
pub async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Readiness probe: 200 only if the document store is usable.
pub async fn readiness<F: PortalFeed, S: DocumentStore>(
    State(state): State<AppState<F, S>>,
) -> impl IntoResponse {
    if state.store.is_healthy().await {
        (StatusCode::OK, "READY")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
    }
}

/// `GET /events?type=&limit=`: newest first.
pub async fn list_events<F: PortalFeed, S: DocumentStore>(
    State(state): State<AppState<F, S>>,
    Query(params): Query<EventsParams>,
) -> Result<Json<EventsResponse>, HttpError> {
    let kind = match params.kind.as_deref() {
        None | Some("" | "all") => None,
        Some(raw) => Some(raw.parse::<EventKind>().map_err(HttpError::BadRequest)?),
    };

    let events = state
        .store
        .list_events(&EventQuery::new(kind, params.limit))
        .await
        .map_err(|e| {
            error!(error = %e, "Event listing failed");
            HttpError::Internal("Failed to fetch events".to_string())
        })?;

    Ok(Json(EventsResponse { events }))
}

/// `GET /votes/:player_id`
pub async fn get_votes<F: PortalFeed, S: DocumentStore>(
    State(state): State<AppState<F, S>>,
    Path(player_id): Path<String>,
) -> Result<Json<VoteResponse>, HttpError> {
    let tally = state.votes.tally(&player_id).await?;
    Ok(Json(tally.into()))
}

/// `POST /votes` with `{playerId, voteType}`.
pub async fn cast_vote<F: PortalFeed, S: DocumentStore>(
    State(state): State<AppState<F, S>>,
    Json(request): Json<VoteRequest>,
) -> Result<Json<VoteResponse>, HttpError> {
    let tally = state
        .votes
        .cast(request.player_id.as_deref(), request.vote_type.as_deref())
        .await?;
    Ok(Json(tally.into()))
}

/// `GET /comments?playerId=`: newest first.
pub async fn list_comments<F: PortalFeed, S: DocumentStore>(
    State(state): State<AppState<F, S>>,
    Query(params): Query<CommentsParams>,
) -> Result<Json<Vec<Comment>>, HttpError> {
    let comments = state.comments.list(params.player_id.as_deref()).await?;
    Ok(Json(comments))
}

/// `POST /comments`: 201 with the stored comment.
pub async fn post_comment<F: PortalFeed, S: DocumentStore>(
    State(state): State<AppState<F, S>>,
    Json(submission): Json<NewComment>,
) -> Result<(StatusCode, Json<Comment>), HttpError> {
    let comment = state.comments.post(submission).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// `POST /comment-votes` with `{commentId, voteType}`.
pub async fn vote_comment<F: PortalFeed, S: DocumentStore>(
    State(state): State<AppState<F, S>>,
    Json(request): Json<CommentVoteRequest>,
) -> Result<Json<VoteResponse>, HttpError> {
    let tally = state
        .comments
        .vote(request.comment_id.as_deref(), request.vote_type.as_deref())
        .await?;
    Ok(Json(tally.into()))
}

/// `GET /players`: filtered and sorted roster.
pub async fn list_players<F: PortalFeed, S: DocumentStore>(
    State(state): State<AppState<F, S>>,
    Query(query): Query<RosterQuery>,
) -> Result<Json<PlayersResponse>, HttpError> {
    let all = state.store.list_snapshots().await.map_err(|e| {
        error!(error = %e, "Roster listing failed");
        HttpError::Internal("Failed to fetch players".to_string())
    })?;

    Ok(Json(PlayersResponse {
        players: query.apply(&all),
        positions: unique_positions(&all),
    }))
}

/// `GET /schools`: origin and destination schools, by name.
pub async fn list_schools<F: PortalFeed, S: DocumentStore>(
    State(state): State<AppState<F, S>>,
) -> Result<Json<SchoolsResponse>, HttpError> {
    let all = state.store.list_snapshots().await.map_err(|e| {
        error!(error = %e, "School listing failed");
        HttpError::Internal("Failed to fetch schools".to_string())
    })?;
    Ok(Json(SchoolsResponse {
        schools: unique_schools(&all),
    }))
}

/// `POST /sync`: run one sync now.
pub async fn trigger_sync<F: PortalFeed, S: DocumentStore>(
    State(state): State<AppState<F, S>>,
    headers: HeaderMap,
) -> Result<Json<SyncResponse>, HttpError> {
    if !authorize(state.cron_secret.as_deref(), &headers) {
        warn!("Rejected sync trigger with bad credentials");
        return Err(HttpError::Unauthorized);
    }

    info!("Sync triggered over HTTP");
    let report = state.sync.run(&state.shutdown).await?;

    Ok(Json(SyncResponse {
        message: report.message(),
        players_processed: report.players_processed,
        events_created: report.events_created,
        skipped_records: report.skipped_records,
    }))
}

/// `GET /sync/status`
pub async fn sync_status<F: PortalFeed, S: DocumentStore>(
    State(state): State<AppState<F, S>>,
) -> Result<Json<SyncStatusResponse>, HttpError> {
    let last_sync = state
        .store
        .last_sync()
        .await
        .map_err(|e| HttpError::Internal(format!("{e:#}")))?;
    Ok(Json(SyncStatusResponse { last_sync }))
}

/// `GET /metrics`: Prometheus text format.
pub async fn metrics<F: PortalFeed, S: DocumentStore>(
    State(state): State<AppState<F, S>>,
) -> Result<impl IntoResponse, HttpError> {
    let body = state
        .metrics
        .render()
        .map_err(|e| HttpError::Internal(format!("{e:#}")))?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    ))
}
