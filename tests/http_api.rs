//! HTTP API Tests - Handler Behaviour
//!
//! Calls the axum handlers directly with an in-memory store behind
//! them; no socket is opened.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::IntoResponse;
use tokio::sync::watch;

use portal_tracker::adapters::http::handlers::{
    self, CommentVoteRequest, CommentsParams, EventsParams, VoteRequest,
};
use portal_tracker::adapters::http::{AppState, HttpError};
use portal_tracker::adapters::metrics::MetricsRegistry;
use portal_tracker::adapters::persistence::MemoryStore;
use portal_tracker::config::SyncConfig;
use portal_tracker::domain::comment::NewComment;
use portal_tracker::domain::detector::ChangeDetector;
use portal_tracker::domain::player::{PlayerRecord, School};
use portal_tracker::domain::roster::{CommitFilter, RosterQuery, SortField, SortOrder};
use portal_tracker::ports::portal_feed::PortalFeed;
use portal_tracker::usecases::{CommentService, PortalSync, VoteService};

struct FixtureFeed(Vec<PlayerRecord>);

#[async_trait::async_trait]
impl PortalFeed for FixtureFeed {
    async fn fetch_players(&self) -> anyhow::Result<Vec<PlayerRecord>> {
        Ok(self.0.clone())
    }

    fn source_name(&self) -> &'static str {
        "fixture"
    }
}

fn fixture() -> Vec<PlayerRecord> {
    vec![
        PlayerRecord {
            id: Some("p1".into()),
            name: "Jane Doe".into(),
            position: Some("QB".into()),
            national_rank: Some(3),
            from_school: Some(School::new("Oregon", None)),
            to_org: Some(School::new("Texas", None)),
            ..Default::default()
        },
        PlayerRecord {
            id: Some("p2".into()),
            name: "Sam Roe".into(),
            position: Some("WR".into()),
            national_rank: Some(1),
            ..Default::default()
        },
    ]
}

fn app_state(cron_secret: Option<&str>) -> AppState<FixtureFeed, MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let metrics = Arc::new(MetricsRegistry::new().unwrap());
    let sync = PortalSync::new(
        Arc::new(FixtureFeed(fixture())),
        Arc::clone(&store),
        ChangeDetector::default(),
        &SyncConfig::default(),
    )
    .with_metrics(Arc::clone(&metrics));
    let votes = VoteService::new(Arc::clone(&store)).with_metrics(Arc::clone(&metrics));
    let comments = CommentService::new(Arc::clone(&store)).with_metrics(Arc::clone(&metrics));
    let (_tx, shutdown) = watch::channel(false);

    AppState {
        store,
        sync: Arc::new(sync),
        votes: Arc::new(votes),
        comments: Arc::new(comments),
        metrics,
        cron_secret: cron_secret.map(Arc::from),
        shutdown,
    }
}

fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    );
    headers
}

fn status_of(err: HttpError) -> StatusCode {
    err.into_response().status()
}

#[tokio::test]
async fn test_sync_requires_matching_secret() {
    let state = app_state(Some("s3cret"));

    let denied = handlers::trigger_sync(State(state.clone()), HeaderMap::new()).await;
    assert_eq!(status_of(denied.unwrap_err()), StatusCode::UNAUTHORIZED);

    let denied = handlers::trigger_sync(State(state.clone()), bearer("wrong")).await;
    assert_eq!(status_of(denied.unwrap_err()), StatusCode::UNAUTHORIZED);

    let Json(body) = handlers::trigger_sync(State(state), bearer("s3cret"))
        .await
        .unwrap();
    assert_eq!(body.players_processed, 2);
    assert_eq!(body.events_created, 2);
    assert_eq!(body.skipped_records, 0);
}

#[tokio::test]
async fn test_sync_then_list_events_and_status() {
    let state = app_state(None);

    let Json(status) = handlers::sync_status(State(state.clone())).await.unwrap();
    assert!(status.last_sync.is_none());

    handlers::trigger_sync(State(state.clone()), HeaderMap::new())
        .await
        .unwrap();

    let Json(events) = handlers::list_events(
        State(state.clone()),
        Query(EventsParams {
            kind: Some("portal_entry".into()),
            limit: Some(1),
        }),
    )
    .await
    .unwrap();
    assert_eq!(events.events.len(), 1);

    let Json(all) = handlers::list_events(
        State(state.clone()),
        Query(EventsParams {
            kind: Some("all".into()),
            limit: None,
        }),
    )
    .await
    .unwrap();
    assert_eq!(all.events.len(), 2);

    let bad = handlers::list_events(
        State(state.clone()),
        Query(EventsParams {
            kind: Some("transfer".into()),
            limit: None,
        }),
    )
    .await;
    assert_eq!(status_of(bad.unwrap_err()), StatusCode::BAD_REQUEST);

    let Json(status) = handlers::sync_status(State(state)).await.unwrap();
    assert!(status.last_sync.is_some());
}

#[tokio::test]
async fn test_votes_round_trip_and_validation() {
    let state = app_state(None);

    let Json(tally) = handlers::cast_vote(
        State(state.clone()),
        Json(VoteRequest {
            player_id: Some("p1".into()),
            vote_type: Some("down".into()),
        }),
    )
    .await
    .unwrap();
    assert_eq!((tally.upvotes, tally.downvotes, tally.score), (0, 1, -1));

    let Json(read) = handlers::get_votes(State(state.clone()), Path("p1".to_string()))
        .await
        .unwrap();
    assert_eq!(read, tally);

    let missing = handlers::cast_vote(
        State(state.clone()),
        Json(VoteRequest {
            player_id: None,
            vote_type: Some("up".into()),
        }),
    )
    .await;
    assert_eq!(status_of(missing.unwrap_err()), StatusCode::BAD_REQUEST);

    let invalid = handlers::cast_vote(
        State(state),
        Json(VoteRequest {
            player_id: Some("p1".into()),
            vote_type: Some("meh".into()),
        }),
    )
    .await;
    assert_eq!(status_of(invalid.unwrap_err()), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_players_filter_and_positions() {
    let state = app_state(None);
    handlers::trigger_sync(State(state.clone()), HeaderMap::new())
        .await
        .unwrap();

    let Json(ranked) = handlers::list_players(State(state.clone()), Query(RosterQuery::default()))
        .await
        .unwrap();
    let ids: Vec<&str> = ranked.players.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p2", "p1"]);
    assert_eq!(ranked.positions, vec!["QB", "WR"]);

    let Json(committed) = handlers::list_players(
        State(state),
        Query(RosterQuery {
            status: CommitFilter::Committed,
            sort: SortField::Name,
            order: SortOrder::Desc,
            ..Default::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(committed.players.len(), 1);
    assert_eq!(committed.players[0].name, "Jane Doe");
    assert_eq!(committed.positions.len(), 2);
}

#[tokio::test]
async fn test_probes_and_metrics() {
    let state = app_state(None);

    assert_eq!(
        handlers::liveness().await.into_response().status(),
        StatusCode::OK
    );
    assert_eq!(
        handlers::readiness(State(state.clone()))
            .await
            .into_response()
            .status(),
        StatusCode::OK
    );

    handlers::trigger_sync(State(state.clone()), HeaderMap::new())
        .await
        .unwrap();
    let response = handlers::metrics(State(state))
        .await
        .unwrap()
        .into_response();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_comments_post_list_and_vote() {
    let state = app_state(None);

    let (status, Json(root)) = handlers::post_comment(
        State(state.clone()),
        Json(NewComment {
            player_id: Some("p1".into()),
            user_id: Some("duckfan".into()),
            college: Some("Oregon".into()),
            message: Some("Huge loss".into()),
            ..Default::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);

    let (_, Json(reply)) = handlers::post_comment(
        State(state.clone()),
        Json(NewComment {
            player_id: Some("p1".into()),
            user_id: Some("longhorn".into()),
            college: Some("Texas".into()),
            message: Some("Our gain".into()),
            parent_id: Some(root.id.clone()),
            reply_to_user: Some("duckfan".into()),
            ..Default::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(reply.parent_id.as_deref(), Some(root.id.as_str()));

    let Json(listed) = handlers::list_comments(
        State(state.clone()),
        Query(CommentsParams {
            player_id: Some("p1".into()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(listed.len(), 2);

    let Json(tally) = handlers::vote_comment(
        State(state.clone()),
        Json(CommentVoteRequest {
            comment_id: Some(root.id.clone()),
            vote_type: Some("up".into()),
        }),
    )
    .await
    .unwrap();
    assert_eq!((tally.upvotes, tally.downvotes, tally.score), (1, 0, 1));

    let missing = handlers::vote_comment(
        State(state.clone()),
        Json(CommentVoteRequest {
            comment_id: Some("no-such-comment".into()),
            vote_type: Some("up".into()),
        }),
    )
    .await;
    assert_eq!(status_of(missing.unwrap_err()), StatusCode::NOT_FOUND);

    let no_player = handlers::list_comments(State(state.clone()), Query(CommentsParams::default())).await;
    assert_eq!(status_of(no_player.unwrap_err()), StatusCode::BAD_REQUEST);

    let too_long = handlers::post_comment(
        State(state),
        Json(NewComment {
            player_id: Some("p1".into()),
            user_id: Some("duckfan".into()),
            college: Some("Oregon".into()),
            message: Some("x".repeat(501)),
            ..Default::default()
        }),
    )
    .await;
    assert_eq!(status_of(too_long.unwrap_err()), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_schools_from_stored_roster() {
    let state = app_state(None);
    handlers::trigger_sync(State(state.clone()), HeaderMap::new())
        .await
        .unwrap();

    let Json(body) = handlers::list_schools(State(state)).await.unwrap();
    let names: Vec<&str> = body.schools.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Oregon", "Texas"]);
}
