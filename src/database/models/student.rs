use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Student row joined with its program and department.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub admission_year: Option<i32>,
    pub status: String,
    pub program_id: Option<i32>,
    pub program_name: Option<String>,
    pub program_level: Option<String>,
    pub department_name: Option<String>,
    pub dept_id: Option<i32>,
}
