use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use super::auth::authenticate;
use crate::auth::{Role, SessionStore, SessionUser};
use crate::error::ApiError;

/// Roles allowed to manage records.
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Roles allowed to record marks.
pub const STAFF: &[Role] = &[Role::Admin, Role::Faculty];

/// Role requirement attached to a group of routes.
///
/// An empty role set admits any authenticated user.
#[derive(Clone)]
pub struct RoleGate {
    sessions: SessionStore,
    roles: &'static [Role],
}

impl RoleGate {
    pub fn new(sessions: SessionStore, roles: &'static [Role]) -> Self {
        Self { sessions, roles }
    }

    pub fn admits(&self, role: Role) -> bool {
        self.roles.is_empty() || self.roles.contains(&role)
    }

    /// Resolves the caller and checks its role.
    pub async fn check(&self, headers: &HeaderMap) -> Result<SessionUser, ApiError> {
        let user = authenticate(&self.sessions, headers)
            .await
            .ok_or(ApiError::Unauthorized)?;

        if !self.admits(user.role) {
            warn!(email = %user.email, role = %user.role, "Role not permitted for route");
            return Err(ApiError::Forbidden);
        }

        Ok(user)
    }
}

/// Middleware enforcing a [`RoleGate`]. The wrapped handler only runs once
/// the check passes, and it can read the caller as `Extension<SessionUser>`.
pub async fn require_role(
    State(gate): State<RoleGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = gate.check(request.headers()).await.map_err(|e| {
        debug!(method = %request.method(), path = %request.uri().path(), "Request rejected: {}", e);
        e
    })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header::AUTHORIZATION, Method, StatusCode},
        middleware::from_fn_with_state,
        routing::post,
        Extension, Router,
    };
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use tower::ServiceExt;

    fn user(role: Role) -> SessionUser {
        SessionUser {
            email: format!("{}@college.edu", role),
            role,
            name: format!("{} user", role),
        }
    }

    /// Router with one gated route whose handler counts its invocations.
    fn gated_router(gate: RoleGate, calls: Arc<AtomicUsize>) -> Router {
        Router::new()
            .route(
                "/guarded",
                post(move |Extension(user): Extension<SessionUser>| {
                    let calls = calls.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        (StatusCode::CREATED, user.email)
                    }
                }),
            )
            .route_layer(from_fn_with_state(gate, require_role))
    }

    fn request(token: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().method(Method::POST).uri("/guarded");
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from("{\"name\":\"ECE\"}")).unwrap()
    }

    #[test]
    fn empty_role_set_admits_everyone() {
        let gate = RoleGate::new(SessionStore::new(), &[]);
        assert!(gate.admits(Role::Admin));
        assert!(gate.admits(Role::Student));

        let staff = RoleGate::new(SessionStore::new(), STAFF);
        assert!(staff.admits(Role::Faculty));
        assert!(!staff.admits(Role::Student));
    }

    #[tokio::test]
    async fn missing_identity_is_unauthorized_and_handler_skipped() {
        let sessions = SessionStore::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let app = gated_router(RoleGate::new(sessions, ADMIN_ONLY), calls.clone());

        let response = app.clone().oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app.oneshot(request(Some("forged-token"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn wrong_role_is_forbidden_and_handler_skipped() {
        let sessions = SessionStore::new();
        let faculty = sessions.create(user(Role::Faculty)).await;
        let student = sessions.create(user(Role::Student)).await;
        let calls = Arc::new(AtomicUsize::new(0));
        let app = gated_router(RoleGate::new(sessions, ADMIN_ONLY), calls.clone());

        for token in [&faculty, &student] {
            let response = app.clone().oneshot(request(Some(token))).await.unwrap();
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            assert_eq!(&bytes[..], br#"{"error":"Forbidden"}"#);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn permitted_role_reaches_handler_unchanged() {
        let sessions = SessionStore::new();
        let token = sessions.create(user(Role::Faculty)).await;
        let calls = Arc::new(AtomicUsize::new(0));
        let app = gated_router(RoleGate::new(sessions, STAFF), calls.clone());

        let response = app.oneshot(request(Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"faculty@college.edu");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn revoked_token_is_unauthorized() {
        let sessions = SessionStore::new();
        let token = sessions.create(user(Role::Admin)).await;
        let calls = Arc::new(AtomicUsize::new(0));
        let app = gated_router(RoleGate::new(sessions.clone(), ADMIN_ONLY), calls.clone());

        sessions.revoke(&token).await;
        let response = app.oneshot(request(Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
