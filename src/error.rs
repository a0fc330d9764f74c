// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::fmt::Display;

use crate::database::DatabaseError;

/// Message returned whenever a database connection cannot be opened.
pub const DATABASE_UNAVAILABLE: &str = "Database connection failed";

/// HTTP API error. Every variant renders as `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    // 400 Bad Request: missing or malformed input
    Validation(String),

    // 400 Bad Request: uniqueness or foreign-key constraint
    Conflict(String),

    // 401 Unauthorized
    Unauthorized,
    InvalidCredentials,

    // 403 Forbidden
    Forbidden,

    // 404 Not Found
    NotFound(String),

    // 405 Method Not Allowed: known path, unsupported method
    MethodNotAllowed,

    // 500, database could not be reached; the process keeps serving
    ServiceUnavailable,

    // 500 Internal Server Error
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::ServiceUnavailable | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-facing error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation(msg)
            | ApiError::Conflict(msg)
            | ApiError::NotFound(msg)
            | ApiError::Internal(msg) => msg,
            ApiError::Unauthorized => "Unauthorized",
            ApiError::InvalidCredentials => "Invalid credentials",
            ApiError::Forbidden => "Forbidden",
            ApiError::MethodNotAllowed => "Method not allowed",
            ApiError::ServiceUnavailable => DATABASE_UNAVAILABLE,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({ "error": self.message() })
    }
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn missing_field(field: &str) -> Self {
        ApiError::Validation(format!("Missing required field: {}", field))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    /// Logs the underlying cause and keeps it out of the response body.
    pub fn internal_from(message: impl Into<String>, cause: impl Display) -> Self {
        let message = message.into();
        tracing::error!(error = %cause, "{}", message);
        ApiError::Internal(message)
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::UniqueViolation(_)
            | DatabaseError::ForeignKeyViolation(_)
            | DatabaseError::ConstraintViolation(_) => {
                tracing::warn!("Integrity violation: {}", err);
                ApiError::conflict("Database integrity error")
            }
            DatabaseError::Sqlx(sqlx_err) => ApiError::internal_from("Database error occurred", sqlx_err),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(ApiError::missing_field("email").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::conflict("dup").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("gone").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::MethodNotAllowed.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(ApiError::ServiceUnavailable.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::internal("boom").status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn body_has_single_error_key() {
        assert_eq!(
            ApiError::ServiceUnavailable.to_json(),
            json!({ "error": "Database connection failed" })
        );
        assert_eq!(
            ApiError::missing_field("student_id").to_json(),
            json!({ "error": "Missing required field: student_id" })
        );
        assert_eq!(ApiError::Forbidden.to_json(), json!({ "error": "Forbidden" }));
    }

    #[test]
    fn integrity_violations_map_to_bad_request() {
        let err: ApiError = DatabaseError::UniqueViolation("department_name_key".into()).into();
        assert_eq!(err, ApiError::conflict("Database integrity error"));

        let err: ApiError = DatabaseError::ForeignKeyViolation("score_student_id_fkey".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn driver_errors_hide_detail() {
        let err: ApiError = DatabaseError::Sqlx(sqlx::Error::RowNotFound).into();
        assert_eq!(err, ApiError::internal("Database error occurred"));
    }

    #[tokio::test]
    async fn renders_json_response() {
        let response = ApiError::not_found("Department not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "Department not found" }));
    }
}
