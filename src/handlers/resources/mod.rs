//! Database-backed resource endpoints under `/api`.

pub mod courses;
pub mod dashboard;
pub mod departments;
pub mod faculty;
pub mod programs;
pub mod scores;
pub mod students;
