use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::auth::{SessionStore, SessionUser};

const BEARER_PREFIX: &str = "Bearer ";

/// Extracts the token from an `Authorization: Bearer <token>` header.
///
/// Returns `None` for a missing header, a non-UTF-8 value, any other scheme,
/// or an empty token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix(BEARER_PREFIX)?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Resolves the acting identity for a request. Fails closed: anything short
/// of a well-formed header carrying a live token yields `None`.
pub async fn authenticate(sessions: &SessionStore, headers: &HeaderMap) -> Option<SessionUser> {
    let token = bearer_token(headers)?;
    sessions.lookup(token).await
}
