use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub course_id: i32,
    pub code: String,
    pub title: String,
    pub credits: Option<i32>,
    pub dept_id: i32,
    pub department_name: Option<String>,
}
