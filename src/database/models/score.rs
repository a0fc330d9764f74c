use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Score row as listed by `GET /api/scores`.
///
/// `score` mirrors `marks_obtained`; both render as JSON numbers.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScoreRow {
    pub score_id: i32,
    pub student_id: String,
    pub student_name: String,
    pub assessment_id: i32,
    pub course_title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub score: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub marks_obtained: Decimal,
}
