use axum::extract::State;

use crate::database::models::Program;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/programs
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Program>> {
    let mut conn = state.db.acquire().await?;

    let programs = sqlx::query_as::<_, Program>(
        "SELECT p.program_id, p.name, p.level, p.dept_id, d.name AS department_name \
         FROM program p \
         LEFT JOIN department d ON p.dept_id = d.dept_id \
         ORDER BY p.name",
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| ApiError::internal_from("Failed to fetch programs", e))?;

    Ok(ApiResponse::ok(programs))
}
