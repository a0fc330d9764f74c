use axum::{extract::State, http::HeaderMap};
use serde::Serialize;
use tracing::{info, warn};

use crate::auth::SessionUser;
use crate::error::ApiError;
use crate::handlers::extract::JsonBody;
use crate::middleware::{bearer_token, ApiResponse, ApiResult, Success};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: SessionUser,
}

/// POST /api/login - exchange email/password for a bearer token
pub async fn login(State(state): State<AppState>, body: JsonBody) -> ApiResult<LoginResponse> {
    // Credentials are compared verbatim, so no trimming here.
    let email = body.0.get("email").and_then(|v| v.as_str()).unwrap_or_default();
    let password = body.0.get("password").and_then(|v| v.as_str()).unwrap_or_default();

    let Some(user) = state.users.verify(email, password) else {
        warn!(email = %email, "Login failed: invalid credentials");
        return Err(ApiError::InvalidCredentials);
    };

    let token = state.sessions.create(user.clone()).await;
    let active_sessions = state.sessions.len().await;
    info!(
        email = %user.email,
        role = %user.role,
        active_sessions = active_sessions,
        "Login successful"
    );

    Ok(ApiResponse::ok(LoginResponse {
        success: true,
        token,
        user,
    }))
}

/// POST /api/logout - revoke the presented token, if any. Always succeeds.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResponse<Success> {
    if let Some(token) = bearer_token(&headers) {
        let user = state.sessions.lookup(token).await;
        state.sessions.revoke(token).await;
        if let Some(user) = user {
            let active_sessions = state.sessions.len().await;
            info!(email = %user.email, active_sessions = active_sessions, "Logout");
        }
    }
    Success::ok()
}
