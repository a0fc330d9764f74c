use axum::extract::State;
use serde::Serialize;
use sqlx::PgConnection;
use tracing::warn;

use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Serialize)]
pub struct DashboardStats {
    pub total_students: i64,
    pub total_faculty: i64,
    pub total_courses: i64,
    pub total_assessments: i64,
}

/// A failing count is logged and reported as zero.
async fn count(conn: &mut PgConnection, label: &str, sql: &str) -> i64 {
    match sqlx::query_scalar::<_, i64>(sql).fetch_one(&mut *conn).await {
        Ok(n) => n,
        Err(e) => {
            warn!(error = %e, "Failed to count {}", label);
            0
        }
    }
}

/// GET /api/dashboard/stats
pub async fn stats(State(state): State<AppState>) -> ApiResult<DashboardStats> {
    let mut conn = state.db.acquire().await?;

    let stats = DashboardStats {
        total_students: count(&mut conn, "students", "SELECT COUNT(*) FROM student WHERE status = 'Active'").await,
        total_faculty: count(&mut conn, "faculty", "SELECT COUNT(*) FROM faculty").await,
        total_courses: count(&mut conn, "courses", "SELECT COUNT(*) FROM course").await,
        total_assessments: count(&mut conn, "assessments", "SELECT COUNT(*) FROM assessment").await,
    };

    Ok(ApiResponse::ok(stats))
}
