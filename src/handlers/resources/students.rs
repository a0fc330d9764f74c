use axum::{extract::State, Extension};
use chrono::{Datelike, Utc};
use serde_json::{json, Value};
use sqlx::Connection;
use tracing::info;

use crate::auth::SessionUser;
use crate::database::{models::Student, DatabaseError};
use crate::error::ApiError;
use crate::handlers::extract::{JsonBody, RecordId};
use crate::middleware::{ApiResponse, ApiResult, Message};
use crate::state::AppState;

/// Rows that reference a student, removed before the student itself.
const DELETE_SEQUENCE: [&str; 4] = [
    "DELETE FROM enrollment WHERE student_id = $1",
    "DELETE FROM attendance WHERE student_id = $1",
    "DELETE FROM score WHERE student_id = $1",
    "DELETE FROM student WHERE student_id = $1",
];

const LIST_SQL: &str = r#"
    SELECT
        s.student_id, s.first_name, s.last_name, s.dob, s.gender, s.email,
        s.phone, s.address, s.admission_year, s.status, s.program_id,
        p.name AS program_name,
        p.level AS program_level,
        d.name AS department_name,
        d.dept_id
    FROM student s
    LEFT JOIN program p ON s.program_id = p.program_id
    LEFT JOIN department d ON p.dept_id = d.dept_id
    ORDER BY s.student_id
"#;

/// GET /api/students
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Student>> {
    let mut conn = state.db.acquire().await?;

    let students = sqlx::query_as::<_, Student>(LIST_SQL)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| ApiError::internal_from("Failed to fetch students", e))?;

    Ok(ApiResponse::ok(students))
}

/// POST /api/students
pub async fn create(
    State(state): State<AppState>,
    Extension(actor): Extension<SessionUser>,
    body: JsonBody,
) -> ApiResult<Value> {
    let mut conn = state.db.acquire().await?;

    let student_id = body.required_text("student_id")?;
    let first_name = body.required_text("first_name")?;
    let last_name = body.required_text("last_name")?;
    let email = body.required_text("email")?;
    let gender = body.text("gender")?.unwrap_or_else(|| "Male".to_string());
    let admission_year = body.int("admission_year")?.unwrap_or_else(|| Utc::now().year());
    let status = body.text("status")?.unwrap_or_else(|| "Active".to_string());

    sqlx::query(
        "INSERT INTO student \
         (student_id, first_name, last_name, dob, gender, email, phone, address, admission_year, status, program_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(&student_id)
    .bind(first_name)
    .bind(last_name)
    .bind(body.date("dob")?)
    .bind(gender)
    .bind(email)
    .bind(body.text("phone")?)
    .bind(body.text("address")?)
    .bind(admission_year)
    .bind(status)
    .bind(body.int("program_id")?)
    .execute(&mut *conn)
    .await
    .map_err(|e| match DatabaseError::from(e) {
        DatabaseError::UniqueViolation(_) => ApiError::conflict("Student ID or Email already exists"),
        err => ApiError::from(err),
    })?;

    info!(actor = %actor.email, student_id = %student_id, "Student created");
    Ok(ApiResponse::created(json!({
        "message": "Student added successfully",
        "student_id": student_id,
    })))
}

/// DELETE /api/students/:student_id
///
/// Enrollment, attendance and score rows are removed in the same
/// transaction as the student.
pub async fn delete(
    State(state): State<AppState>,
    Extension(actor): Extension<SessionUser>,
    RecordId(student_id): RecordId<String>,
) -> ApiResult<Message> {
    let mut conn = state.db.acquire().await?;
    let mut tx = conn
        .begin()
        .await
        .map_err(|e| ApiError::internal_from("Failed to delete student", e))?;

    let exists = sqlx::query_scalar::<_, String>("SELECT student_id FROM student WHERE student_id = $1")
        .bind(&student_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| ApiError::internal_from("Failed to delete student", e))?;
    if exists.is_none() {
        return Err(ApiError::not_found("Student not found"));
    }

    for statement in DELETE_SEQUENCE {
        sqlx::query(statement)
            .bind(&student_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| match DatabaseError::from(e) {
                err if err.is_integrity_violation() => ApiError::from(err),
                err => ApiError::internal_from("Failed to delete student", err),
            })?;
    }

    tx.commit()
        .await
        .map_err(|e| ApiError::internal_from("Failed to delete student", e))?;

    info!(actor = %actor.email, student_id = %student_id, "Student deleted");
    Ok(Message::ok("Student deleted successfully"))
}
