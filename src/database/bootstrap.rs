use sqlx::Executor;
use tracing::{info, warn};

use super::manager::{Database, DatabaseError};

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Departments every installation starts with.
pub const DEFAULT_DEPARTMENTS: [&str; 4] = ["CSE", "IT", "AIDS", "ECE"];

/// Creates missing tables and seeds the default departments.
///
/// Startup must not depend on the database being up, so an unreachable
/// database is logged and skipped rather than reported as an error.
pub async fn bootstrap(db: &Database) -> Result<(), DatabaseError> {
    let Some(mut conn) = db.connect().await else {
        warn!(target_db = %db.description(), "Skipping schema bootstrap: database unavailable");
        return Ok(());
    };

    (&mut *conn).execute(SCHEMA_SQL).await?;

    let mut seeded = 0;
    for name in DEFAULT_DEPARTMENTS {
        let result = sqlx::query("INSERT INTO department (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(&mut *conn)
            .await?;
        seeded += result.rows_affected();
    }

    info!(target_db = %db.description(), seeded_departments = seeded, "Schema bootstrap complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_declares_every_table() {
        for table in [
            "department",
            "program",
            "student",
            "faculty",
            "course",
            "assessment",
            "score",
            "enrollment",
            "attendance",
        ] {
            let ddl = format!("CREATE TABLE IF NOT EXISTS {} (", table);
            assert!(SCHEMA_SQL.contains(&ddl), "missing table {}", table);
        }
    }

    #[test]
    fn schema_is_idempotent() {
        let creates = SCHEMA_SQL.matches("CREATE ").count();
        let guarded = SCHEMA_SQL.matches("IF NOT EXISTS").count();
        assert_eq!(creates, guarded);
    }
}
