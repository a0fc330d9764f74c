use axum::{extract::State, Extension};
use serde_json::{json, Value};
use sqlx::{Postgres, QueryBuilder};
use tracing::info;

use crate::auth::SessionUser;
use crate::database::{models::ScoreRow, DatabaseError};
use crate::error::ApiError;
use crate::handlers::extract::{JsonBody, RecordId};
use crate::middleware::{ApiResponse, ApiResult, Success};
use crate::state::AppState;

const NOT_FOUND: &str = "Score not found";
const INVALID_REFERENCE: &str = "Invalid student or course reference";

// Names fall back to the student id and "Assessment <id>" when the joined
// rows are missing or blank.
const LIST_SQL: &str = r#"
    SELECT
        s.score_id,
        s.student_id,
        COALESCE(NULLIF(TRIM(CONCAT_WS(' ', st.first_name, st.last_name)), ''), s.student_id) AS student_name,
        s.assessment_id,
        COALESCE(NULLIF(TRIM(c.title), ''), 'Assessment ' || s.assessment_id) AS course_title,
        s.marks_obtained AS score,
        s.marks_obtained
    FROM score s
    LEFT JOIN student st ON s.student_id = st.student_id
    LEFT JOIN assessment a ON s.assessment_id = a.assessment_id
    LEFT JOIN course c ON a.course_id = c.course_id
    ORDER BY s.score_id
"#;

fn map_write_error(err: sqlx::Error, action: &str) -> ApiError {
    match DatabaseError::from(err) {
        err if err.is_integrity_violation() => ApiError::conflict(INVALID_REFERENCE),
        err => ApiError::internal_from(format!("Failed to {} score", action), err),
    }
}

/// GET /api/scores
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<ScoreRow>> {
    let mut conn = state.db.acquire().await?;

    let scores = sqlx::query_as::<_, ScoreRow>(LIST_SQL)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| ApiError::internal_from("Failed to fetch scores", e))?;

    Ok(ApiResponse::ok(scores))
}

/// POST /api/scores
pub async fn create(
    State(state): State<AppState>,
    Extension(actor): Extension<SessionUser>,
    body: JsonBody,
) -> ApiResult<Value> {
    let mut conn = state.db.acquire().await?;

    let student_id = body.required_text("student_id")?;
    let assessment_id = body.required_int("assessment_id")?;
    let marks = body.required_decimal("marks_obtained")?;

    let score_id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO score (student_id, assessment_id, marks_obtained) VALUES ($1, $2, $3) RETURNING score_id",
    )
    .bind(&student_id)
    .bind(assessment_id)
    .bind(marks)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| map_write_error(e, "add"))?;

    info!(
        actor = %actor.email,
        score_id,
        student_id = %student_id,
        assessment_id,
        marks = %marks,
        "Score recorded"
    );
    Ok(ApiResponse::created(json!({
        "score_id": score_id,
        "message": "Score added successfully",
    })))
}

/// PUT /api/scores/:score_id
pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<SessionUser>,
    RecordId(score_id): RecordId<i32>,
    body: JsonBody,
) -> ApiResult<Success> {
    let mut conn = state.db.acquire().await?;

    let mut builder = QueryBuilder::<Postgres>::new("UPDATE score SET ");
    let mut assignments = builder.separated(", ");
    let mut changed = Vec::new();

    if let Some(student_id) = body.text("student_id")? {
        assignments.push("student_id = ");
        assignments.push_bind_unseparated(student_id);
        changed.push("student_id");
    }
    if let Some(assessment_id) = body.int("assessment_id")? {
        assignments.push("assessment_id = ");
        assignments.push_bind_unseparated(assessment_id);
        changed.push("assessment_id");
    }
    if let Some(marks) = body.decimal("marks_obtained")? {
        assignments.push("marks_obtained = ");
        assignments.push_bind_unseparated(marks);
        changed.push("marks_obtained");
    }

    if changed.is_empty() {
        return Err(ApiError::validation("No fields to update"));
    }

    builder.push(" WHERE score_id = ");
    builder.push_bind(score_id);

    let result = builder
        .build()
        .execute(&mut *conn)
        .await
        .map_err(|e| map_write_error(e, "update"))?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    info!(actor = %actor.email, score_id, fields = ?changed, "Score updated");
    Ok(Success::ok())
}

/// DELETE /api/scores/:score_id
pub async fn delete(
    State(state): State<AppState>,
    Extension(actor): Extension<SessionUser>,
    RecordId(score_id): RecordId<i32>,
) -> ApiResult<Success> {
    let mut conn = state.db.acquire().await?;

    let result = sqlx::query("DELETE FROM score WHERE score_id = $1")
        .bind(score_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| ApiError::internal_from("Failed to delete score", e))?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    info!(actor = %actor.email, score_id, "Score deleted");
    Ok(Success::ok())
}
