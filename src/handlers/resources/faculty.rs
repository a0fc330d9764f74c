use axum::{extract::State, Extension};
use serde_json::{json, Value};
use sqlx::{Postgres, QueryBuilder};
use tracing::info;

use crate::auth::SessionUser;
use crate::database::{models::Faculty, DatabaseError};
use crate::error::ApiError;
use crate::handlers::extract::{JsonBody, RecordId};
use crate::middleware::{ApiResponse, ApiResult, Success};
use crate::state::AppState;

const NOT_FOUND: &str = "Faculty not found";
const INVALID_DATA: &str = "Duplicate or invalid data";

/// Text columns accepted by a partial update, in the order they are applied.
const UPDATABLE_TEXT: [&str; 5] = ["first_name", "last_name", "designation", "email", "phone"];

fn map_write_error(err: sqlx::Error, action: &str) -> ApiError {
    match DatabaseError::from(err) {
        err if err.is_integrity_violation() => ApiError::conflict(INVALID_DATA),
        err => ApiError::internal_from(format!("Failed to {} faculty", action), err),
    }
}

/// GET /api/faculty
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Faculty>> {
    let mut conn = state.db.acquire().await?;

    let faculty = sqlx::query_as::<_, Faculty>(
        "SELECT f.faculty_id, f.first_name, f.last_name, f.designation, f.email, f.phone, f.dept_id, \
         d.name AS department_name \
         FROM faculty f \
         LEFT JOIN department d ON f.dept_id = d.dept_id \
         ORDER BY f.faculty_id",
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| ApiError::internal_from("Failed to fetch faculty", e))?;

    Ok(ApiResponse::ok(faculty))
}

/// POST /api/faculty
pub async fn create(
    State(state): State<AppState>,
    Extension(actor): Extension<SessionUser>,
    body: JsonBody,
) -> ApiResult<Value> {
    let mut conn = state.db.acquire().await?;

    let first_name = body.required_text("first_name")?;
    let last_name = body.required_text("last_name")?;
    let email = body.required_text("email")?;
    let designation = body.required_text("designation")?;
    let dept_id = body.required_int("dept_id")?;

    let faculty_id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO faculty (first_name, last_name, designation, email, phone, dept_id) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING faculty_id",
    )
    .bind(first_name)
    .bind(last_name)
    .bind(designation)
    .bind(&email)
    .bind(body.text("phone")?)
    .bind(dept_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| map_write_error(e, "add"))?;

    info!(actor = %actor.email, faculty_id, email = %email, "Faculty created");
    Ok(ApiResponse::created(json!({ "faculty_id": faculty_id })))
}

/// PUT /api/faculty/:faculty_id
///
/// Only the fields present in the body are written.
pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<SessionUser>,
    RecordId(faculty_id): RecordId<i32>,
    body: JsonBody,
) -> ApiResult<Success> {
    let mut conn = state.db.acquire().await?;

    let mut builder = QueryBuilder::<Postgres>::new("UPDATE faculty SET ");
    let mut assignments = builder.separated(", ");
    let mut changed = Vec::new();

    for column in UPDATABLE_TEXT {
        if let Some(value) = body.text(column)? {
            assignments.push(format!("{} = ", column));
            assignments.push_bind_unseparated(value);
            changed.push(column);
        }
    }
    if let Some(dept_id) = body.int("dept_id")? {
        assignments.push("dept_id = ");
        assignments.push_bind_unseparated(dept_id);
        changed.push("dept_id");
    }

    if changed.is_empty() {
        return Err(ApiError::validation("No fields to update"));
    }

    builder.push(" WHERE faculty_id = ");
    builder.push_bind(faculty_id);

    let result = builder
        .build()
        .execute(&mut *conn)
        .await
        .map_err(|e| map_write_error(e, "update"))?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    info!(actor = %actor.email, faculty_id, fields = ?changed, "Faculty updated");
    Ok(Success::ok())
}

/// DELETE /api/faculty/:faculty_id
pub async fn delete(
    State(state): State<AppState>,
    Extension(actor): Extension<SessionUser>,
    RecordId(faculty_id): RecordId<i32>,
) -> ApiResult<Success> {
    let mut conn = state.db.acquire().await?;

    let result = sqlx::query("DELETE FROM faculty WHERE faculty_id = $1")
        .bind(faculty_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| match DatabaseError::from(e) {
            err if err.is_integrity_violation() => {
                ApiError::conflict("Cannot delete faculty referenced by other records")
            }
            err => ApiError::internal_from("Failed to delete faculty", err),
        })?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    info!(actor = %actor.email, faculty_id, "Faculty deleted");
    Ok(Success::ok())
}
