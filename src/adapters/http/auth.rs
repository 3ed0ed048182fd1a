//! Bearer-token check for the sync trigger.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

/// Whether the request may trigger a sync.
///
/// With no secret configured every request is allowed.
pub fn authorize(secret: Option<&str>, headers: &HeaderMap) -> bool {
    let Some(secret) = secret else {
        return true;
    };
    extract_bearer(headers).is_some_and(|token| token == secret)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}
