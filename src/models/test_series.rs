// src/models/test_series.rs

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use url::Url;
use validator::Validate;

use crate::models::exam::Exam;

/// A single question embedded in a test series.
///
/// Questions have no independent lifecycle: they live inside the
/// `questions` JSON column of their series and their ids are assigned
/// from the series' monotonic counter (never reused after deletion).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub correct_answer: String,
    pub options: Vec<String>,
    pub marks: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Represents the 'test_series' table in the database.
///
/// `total_marks` and `number_of_questions` are derived aggregates: they
/// must always equal the sum of marks and the count of the embedded
/// questions. Every question mutation re-establishes them.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSeries {
    pub id: i64,
    pub subject: String,
    pub exam_name: String,
    pub number_of_questions: i64,
    /// Duration in minutes.
    pub duration: i64,
    pub passing_marks: i64,
    pub total_marks: i64,
    pub description: Option<String>,
    /// Public URL of the uploaded question paper, if any.
    pub url: Option<String>,
    pub category_id: i64,
    pub exam_id: i64,
    /// Embedded question list, stored as a JSON array.
    pub questions: Json<Vec<Question>>,
    /// Next id to hand out to an appended question.
    #[serde(skip)]
    pub next_question_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Series metadata without the question list (summary view for listings).
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSeriesMeta {
    pub id: i64,
    pub subject: String,
    pub exam_name: String,
    pub number_of_questions: i64,
    pub duration: i64,
    pub passing_marks: i64,
    pub total_marks: i64,
    pub description: Option<String>,
    pub url: Option<String>,
    pub category_id: i64,
    pub exam_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Summary row returned by `GET /api/test-series`: metadata plus the
/// category name and exam resolved by id lookup. Dangling references
/// degrade to `None` instead of failing the listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSeriesSummary {
    #[serde(flatten)]
    pub meta: TestSeriesMeta,
    pub category_name: Option<String>,
    pub exam: Option<Exam>,
}

/// DTO for creating a new test series.
///
/// The derived aggregates are not accepted from input: a new series
/// always starts with zero questions and zero total marks.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestSeriesRequest {
    #[validate(length(min = 1, max = 100, message = "Subject must be between 1 and 100 characters."))]
    pub subject: String,
    #[validate(length(min = 1, max = 100, message = "Exam name must be between 1 and 100 characters."))]
    pub exam_name: String,
    #[validate(range(min = 1, message = "Duration must be at least one minute."))]
    pub duration: i64,
    #[validate(range(min = 0, message = "Passing marks cannot be negative."))]
    pub passing_marks: i64,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(custom(function = validate_optional_url))]
    pub url: Option<String>,
    pub category_id: i64,
    pub exam_id: i64,
}

/// DTO for updating series metadata. Fields are optional; the question
/// list and its derived aggregates cannot be patched through this DTO.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTestSeriesRequest {
    pub subject: Option<String>,
    pub exam_name: Option<String>,
    pub duration: Option<i64>,
    pub passing_marks: Option<i64>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub category_id: Option<i64>,
    pub exam_id: Option<i64>,
}

/// DTO for appending a question to a series.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 2000, message = "Question text must be between 1 and 2000 characters."))]
    pub question: String,
    #[validate(length(min = 1, max = 500, message = "Correct answer must be between 1 and 500 characters."))]
    pub correct_answer: String,
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,
    #[validate(range(min = 0, message = "Marks cannot be negative."))]
    pub marks: i64,
    #[validate(custom(function = validate_optional_url))]
    pub image_url: Option<String>,
}

/// DTO for patching an embedded question. Fields are optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuestionRequest {
    pub question: Option<String>,
    pub correct_answer: Option<String>,
    pub options: Option<Vec<String>>,
    pub marks: Option<i64>,
    pub image_url: Option<String>,
}

fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    if options.is_empty() {
        return Err(validator::ValidationError::new("options_cannot_be_empty"));
    }
    for opt in options {
        if opt.len() > 500 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}

/// Validates that a string, when present, is a correctly formatted URL.
fn validate_optional_url(url: &str) -> Result<(), validator::ValidationError> {
    if Url::parse(url).is_err() {
        return Err(validator::ValidationError::new("invalid_url"));
    }
    Ok(())
}
