use axum::{
    extract::State,
    http::{header::ALLOW, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};
use std::any::Any;
use tracing::error;

use crate::error::{ApiError, DATABASE_UNAVAILABLE};
use crate::state::AppState;

/// GET / - service index
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "College Records API",
        "version": version,
        "endpoints": {
            "session": "/api/login, /api/logout",
            "students": "/api/students[/:student_id]",
            "departments": "/api/departments[/:dept_id]",
            "programs": "/api/programs",
            "faculty": "/api/faculty[/:faculty_id]",
            "courses": "/api/courses[/:course_id]",
            "scores": "/api/scores[/:score_id]",
            "dashboard": "/api/dashboard/stats",
            "health": "/api/health",
        }
    }))
}

/// GET /api/health - reports whether the database accepts connections
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    if state.db.health_check().await {
        (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected",
                "message": "Backend is running successfully"
            })),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "status": "unhealthy",
                "database": "disconnected",
                "message": DATABASE_UNAVAILABLE
            })),
        )
    }
}

/// Fallback for unknown routes
pub async fn not_found() -> ApiError {
    ApiError::not_found("Endpoint not found")
}

/// Response for a handler that panicked.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    error!(panic = %detail, "Handler panicked");
    ApiError::internal("Internal server error").into_response()
}

/// Gives the router's bodiless 405 the standard JSON error body, keeping
/// the `Allow` header.
pub async fn method_not_allowed(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }
    let mut replaced = ApiError::MethodNotAllowed.into_response();
    if let Some(allow) = response.headers().get(ALLOW) {
        replaced.headers_mut().insert(ALLOW, allow.clone());
    }
    replaced
}
