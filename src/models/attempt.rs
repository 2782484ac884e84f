// src/models/attempt.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use validator::Validate;

/// Lifecycle state of a user's attempt at a test series.
///
/// `Pending` is the only state that accepts an auto-scored submission.
/// `Submitted` marks an uploaded answer paper awaiting manual grading.
/// Leaving a terminal state requires an explicit re-apply, which resets
/// the attempt to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum AttemptStatus {
    Pending,
    Passed,
    Failed,
    Submitted,
}

/// One entry in an attempt's answer trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptAnswer {
    pub question_id: i64,

    /// Answer kind: 'MCQ' or 'Descriptive'. Auto-scored submissions
    /// always record 'MCQ'; descriptive entries are graded manually.
    #[serde(rename = "type")]
    pub kind: String,

    pub answer: String,

    /// Marks earned by this answer.
    pub score: i64,
}

/// Represents the 'attempts' table in the database.
///
/// One row per (user, test series), enforced by a unique index. The
/// answer trail is stored as a JSON array column.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub id: i64,
    pub user_id: i64,
    pub test_series_id: i64,

    /// Snapshot of the series' total marks at apply time.
    pub total_marks: i64,

    /// Earned marks; `None` until the attempt is scored.
    pub score: Option<i64>,

    pub status: AttemptStatus,

    /// When the attempt was submitted (auto-scored or answer paper).
    pub exam_date: Option<chrono::DateTime<chrono::Utc>>,

    /// Public URL of the uploaded answer-paper PDF, if any.
    pub answer_paper_url: Option<String>,

    pub answers: Json<Vec<AttemptAnswer>>,

    pub descriptive_total: i64,
    pub descriptive_attempted: i64,
    pub descriptive_score: i64,

    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Submitted answer sheets arrive either as a positional array or as an
/// object keyed by question position. Both normalize to one canonical
/// ordered shape before they reach scoring.
///
/// Keys stay strings here: untagged deserialization buffers the body,
/// which loses serde_json's string-to-integer map-key coercion.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AnswerSheet {
    Ordered(Vec<Option<String>>),
    Keyed(BTreeMap<String, String>),
}

impl AnswerSheet {
    /// Normalizes into one slot per question, in question order.
    ///
    /// Entries beyond `question_count` (and keys that are not
    /// positions) are dropped; positions with no submitted answer stay
    /// `None` and score zero.
    pub fn into_positional(self, question_count: usize) -> Vec<Option<String>> {
        let mut slots = vec![None; question_count];
        match self {
            AnswerSheet::Ordered(answers) => {
                for (i, answer) in answers.into_iter().take(question_count).enumerate() {
                    slots[i] = answer;
                }
            }
            AnswerSheet::Keyed(answers) => {
                for (position, answer) in answers {
                    if let Ok(position) = position.parse::<usize>() {
                        if position < question_count {
                            slots[position] = Some(answer);
                        }
                    }
                }
            }
        }
        slots
    }
}

/// DTO for applying to a test. The series is addressed either by id or
/// by its exam name; at least one must be present. Every field is
/// optional on the wire; presence is enforced in the handler so a
/// missing field reports as a validation error, not a rejected body.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApplyTestRequest {
    #[validate(email(message = "Invalid email format."))]
    pub email: Option<String>,
    pub test_id: Option<i64>,
    pub test_name: Option<String>,
}

/// DTO for submitting answers to an applied test. Presence of each
/// field is enforced in the handler.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTestRequest {
    #[validate(email(message = "Invalid email format."))]
    pub email: Option<String>,
    pub test_id: Option<i64>,
    pub answers: Option<AnswerSheet>,
}

/// Query parameters identifying the requesting user by email.
#[derive(Debug, Deserialize)]
pub struct UserEmailParams {
    pub email: String,
}

/// One row of the applied-tests listing: an attempt joined with its
/// series and exam by sequential id lookups. Dangling references
/// degrade to placeholder strings instead of failing the response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedTest {
    pub test_id: i64,
    pub test_name: String,
    pub subject: Option<String>,
    pub exam_name: String,
    pub status: AttemptStatus,
    pub score: Option<i64>,
    pub total_marks: i64,
    pub exam_date: Option<chrono::DateTime<chrono::Utc>>,
    pub answer_paper_url: Option<String>,
}

/// One row of a user's formatted score report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptReport {
    pub test_id: i64,
    pub test_name: String,
    pub status: AttemptStatus,
    pub score: Option<i64>,
    pub total_marks: i64,
    /// Formatted as "NN.NN%"; `None` while unscored or when the
    /// attempt carries no marks to divide by.
    pub percentage: Option<String>,
    pub grade: Option<String>,
    pub exam_date: Option<chrono::DateTime<chrono::Utc>>,
}
