use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Faculty {
    pub faculty_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub designation: String,
    pub email: String,
    pub phone: Option<String>,
    pub dept_id: i32,
    pub department_name: Option<String>,
}
