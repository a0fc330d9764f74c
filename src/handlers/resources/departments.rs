use axum::{extract::State, Extension};
use serde_json::{json, Value};
use tracing::info;

use crate::auth::SessionUser;
use crate::database::{models::Department, DatabaseError};
use crate::error::ApiError;
use crate::handlers::extract::{JsonBody, RecordId};
use crate::middleware::{ApiResponse, ApiResult, Success};
use crate::state::AppState;

const NOT_FOUND: &str = "Department not found";

fn required_name(body: &JsonBody) -> Result<String, ApiError> {
    body.text("name")?
        .ok_or_else(|| ApiError::validation("Department name is required"))
}

/// GET /api/departments
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Department>> {
    let mut conn = state.db.acquire().await?;

    let departments = sqlx::query_as::<_, Department>("SELECT dept_id, name FROM department ORDER BY name")
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| ApiError::internal_from("Failed to fetch departments", e))?;

    Ok(ApiResponse::ok(departments))
}

/// POST /api/departments
pub async fn create(
    State(state): State<AppState>,
    Extension(actor): Extension<SessionUser>,
    body: JsonBody,
) -> ApiResult<Value> {
    let mut conn = state.db.acquire().await?;
    let name = required_name(&body)?;

    let dept_id = sqlx::query_scalar::<_, i32>("INSERT INTO department (name) VALUES ($1) RETURNING dept_id")
        .bind(&name)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| match DatabaseError::from(e) {
            err if err.is_integrity_violation() => ApiError::conflict("Department already exists"),
            err => ApiError::internal_from("Failed to add department", err),
        })?;

    info!(actor = %actor.email, dept_id, name = %name, "Department created");
    Ok(ApiResponse::created(json!({ "dept_id": dept_id, "name": name })))
}

/// PUT /api/departments/:dept_id
pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<SessionUser>,
    RecordId(dept_id): RecordId<i32>,
    body: JsonBody,
) -> ApiResult<Value> {
    let mut conn = state.db.acquire().await?;
    let name = required_name(&body)?;

    let result = sqlx::query("UPDATE department SET name = $1 WHERE dept_id = $2")
        .bind(&name)
        .bind(dept_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| match DatabaseError::from(e) {
            err if err.is_integrity_violation() => {
                ApiError::conflict("Another department with this name already exists")
            }
            err => ApiError::internal_from("Failed to update department", err),
        })?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    info!(actor = %actor.email, dept_id, name = %name, "Department renamed");
    Ok(ApiResponse::ok(json!({ "dept_id": dept_id, "name": name })))
}

/// DELETE /api/departments/:dept_id
pub async fn delete(
    State(state): State<AppState>,
    Extension(actor): Extension<SessionUser>,
    RecordId(dept_id): RecordId<i32>,
) -> ApiResult<Success> {
    let mut conn = state.db.acquire().await?;

    let result = sqlx::query("DELETE FROM department WHERE dept_id = $1")
        .bind(dept_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| match DatabaseError::from(e) {
            err if err.is_integrity_violation() => {
                ApiError::conflict("Cannot delete department referenced by other records")
            }
            err => ApiError::internal_from("Failed to delete department", err),
        })?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    info!(actor = %actor.email, dept_id, "Department deleted");
    Ok(Success::ok())
}
