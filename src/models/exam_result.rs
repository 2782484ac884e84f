// src/models/exam_result.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::test_series::TestSeriesMeta;

/// Represents the 'exam_results' table in the database.
///
/// Results recorded by an administrator, separate from the attempt
/// lifecycle rows.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    pub id: i64,
    pub user_id: i64,
    pub test_series_id: i64,
    pub score: Option<i64>,

    /// Result status: 'Pending', 'Passed' or 'Failed'.
    pub status: String,

    pub attempted_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for recording a result for a user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordExamResultRequest {
    pub test_series_id: i64,
    pub score: Option<i64>,
    pub status: Option<String>,
}

/// Result joined with its series metadata for list views; `None` when
/// the series has since been deleted.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResultWithSeries {
    #[serde(flatten)]
    pub result: ExamResult,
    pub test_series: Option<TestSeriesMeta>,
}

/// Single result with its computed percentage and grade.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResultDetail {
    #[serde(flatten)]
    pub result: ExamResult,
    pub percentage: String,
    pub grade: String,
}
