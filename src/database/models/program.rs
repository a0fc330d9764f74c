use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Program {
    pub program_id: i32,
    pub name: String,
    pub level: Option<String>,
    pub dept_id: Option<i32>,
    pub department_name: Option<String>,
}
