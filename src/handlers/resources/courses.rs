use axum::{extract::State, Extension};
use serde_json::{json, Value};
use tracing::info;

use crate::auth::SessionUser;
use crate::database::{models::Course, DatabaseError};
use crate::error::ApiError;
use crate::handlers::extract::{JsonBody, RecordId};
use crate::middleware::{ApiResponse, ApiResult, Success};
use crate::state::AppState;

/// GET /api/courses
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Course>> {
    let mut conn = state.db.acquire().await?;

    let courses = sqlx::query_as::<_, Course>(
        "SELECT c.course_id, c.code, c.title, c.credits, c.dept_id, d.name AS department_name \
         FROM course c \
         LEFT JOIN department d ON c.dept_id = d.dept_id \
         ORDER BY c.course_id",
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| ApiError::internal_from("Failed to fetch courses", e))?;

    Ok(ApiResponse::ok(courses))
}

/// POST /api/courses
pub async fn create(
    State(state): State<AppState>,
    Extension(actor): Extension<SessionUser>,
    body: JsonBody,
) -> ApiResult<Value> {
    let mut conn = state.db.acquire().await?;

    let code = body.required_text("code")?;
    let title = body.required_text("title")?;
    let dept_id = body.required_int("dept_id")?;
    let credits = body.int("credits")?;

    let course_id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO course (code, title, credits, dept_id) VALUES ($1, $2, $3, $4) RETURNING course_id",
    )
    .bind(&code)
    .bind(title)
    .bind(credits)
    .bind(dept_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| match DatabaseError::from(e) {
        DatabaseError::UniqueViolation(_) => ApiError::conflict("Course code already exists"),
        DatabaseError::ForeignKeyViolation(_) => ApiError::conflict("Invalid department reference"),
        err if err.is_integrity_violation() => ApiError::from(err),
        err => ApiError::internal_from("Failed to add course", err),
    })?;

    info!(actor = %actor.email, course_id, code = %code, "Course created");
    Ok(ApiResponse::created(json!({ "course_id": course_id })))
}

/// DELETE /api/courses/:course_id
pub async fn delete(
    State(state): State<AppState>,
    Extension(actor): Extension<SessionUser>,
    RecordId(course_id): RecordId<i32>,
) -> ApiResult<Success> {
    let mut conn = state.db.acquire().await?;

    let result = sqlx::query("DELETE FROM course WHERE course_id = $1")
        .bind(course_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| match DatabaseError::from(e) {
            err if err.is_integrity_violation() => {
                ApiError::conflict("Cannot delete course referenced by other records")
            }
            err => ApiError::internal_from("Failed to delete course", err),
        })?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Course not found"));
    }

    info!(actor = %actor.email, course_id, "Course deleted");
    Ok(Success::ok())
}
