//! HTTP error responses. Every error renders as `{"error": "..."}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::{CommentError, SyncError, VoteError};

#[derive(Debug)]
pub enum HttpError {
    Unauthorized,
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<VoteError> for HttpError {
    fn from(value: VoteError) -> Self {
        if value.is_client_error() {
            Self::BadRequest(value.to_string())
        } else {
            Self::Internal(value.to_string())
        }
    }
}

impl From<CommentError> for HttpError {
    fn from(value: CommentError) -> Self {
        match value {
            CommentError::NotFound(_) => Self::NotFound("Comment not found".to_string()),
            e if e.is_client_error() => Self::BadRequest(e.to_string()),
            e => Self::Internal(e.to_string()),
        }
    }
}

impl From<SyncError> for HttpError {
    fn from(value: SyncError) -> Self {
        Self::Internal(value.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
