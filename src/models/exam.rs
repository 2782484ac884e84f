// src/models/exam.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'exams' table in the database.
/// An exam belongs to exactly one category.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Exam joined with its category name for list views.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ExamWithCategory {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    /// Resolved category name; `None` when the category was deleted.
    pub category_name: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for creating a new exam.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExamRequest {
    #[validate(length(min = 1, max = 100, message = "Exam name must be between 1 and 100 characters."))]
    pub name: String,
    pub category_id: i64,
}

/// DTO for updating an exam. Fields are optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExamRequest {
    pub name: Option<String>,
    pub category_id: Option<i64>,
}
