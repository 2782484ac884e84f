// src/handlers/attempt.rs

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::attempt::{
        AppliedTest, ApplyTestRequest, AttemptStatus, SubmitTestRequest, UserEmailParams,
    },
    services::{
        scoring::{build_answer_trail, score_answers},
        storage::{StorageClient, sanitize_object_name},
    },
    store,
};

/// Applies a user to a test series.
///
/// Creates a Pending attempt when none exists. Re-applying while
/// Pending is a no-op; re-applying a graded or submitted attempt
/// resets it to Pending (score, answers and exam date are cleared).
pub async fn apply_test(
    State(pool): State<SqlitePool>,
    Json(payload): Json<ApplyTestRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::Validation(validation_errors.to_string()));
    }
    if payload.email.is_none() || (payload.test_id.is_none() && payload.test_name.is_none()) {
        return Err(AppError::Validation(
            "Email and either testId or testName are required".to_string(),
        ));
    }

    let user = store::users::find_by_email(&pool, payload.email.as_deref().unwrap_or_default())
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let series = match payload.test_id {
        Some(test_id) => store::test_series::find_by_id(&pool, test_id).await?,
        None => {
            let test_name = payload.test_name.as_deref().unwrap_or_default();
            store::test_series::find_by_exam_name(&pool, test_name).await?
        }
    }
    .ok_or(AppError::NotFound("Test not found".to_string()))?;

    let attempt = match store::attempts::find(&pool, user.id, series.id).await? {
        None => {
            match store::attempts::insert_pending(&pool, user.id, series.id, series.total_marks)
                .await
            {
                Ok(attempt) => attempt,
                // Lost a race with a concurrent apply; the row exists now.
                Err(e) if store::is_unique_violation(&e) => {
                    store::attempts::find(&pool, user.id, series.id)
                        .await?
                        .ok_or(AppError::Internal("Attempt not found after apply".to_string()))?
                }
                Err(e) => {
                    tracing::error!("Failed to create attempt: {:?}", e);
                    return Err(AppError::Internal(e.to_string()));
                }
            }
        }
        Some(attempt) if attempt.status == AttemptStatus::Pending => attempt,
        Some(attempt) => {
            store::attempts::reset_to_pending(&pool, attempt.id, series.total_marks)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to reset attempt: {:?}", e);
                    AppError::Internal(e.to_string())
                })?;
            store::attempts::find(&pool, user.id, series.id)
                .await?
                .ok_or(AppError::Internal("Attempt not found after reset".to_string()))?
        }
    };

    Ok(Json(json!({
        "message": "Successfully applied for the test",
        "attempt": attempt,
    })))
}

/// Submits answers for a Pending attempt and scores them against the
/// series' answer key.
///
/// Comparison is exact string equality per question position. The
/// transition out of Pending is a compare-and-swap in the store, so of
/// two concurrent submissions exactly one is scored; the other fails
/// without touching the attempt.
pub async fn submit_test(
    State(pool): State<SqlitePool>,
    Json(payload): Json<SubmitTestRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::Validation(validation_errors.to_string()));
    }
    let email = payload
        .email
        .ok_or(AppError::Validation("Email is required".to_string()))?;
    let test_id = payload
        .test_id
        .ok_or(AppError::Validation("testId is required".to_string()))?;
    let answers = payload
        .answers
        .ok_or(AppError::Validation("Answers are required".to_string()))?;

    let user = store::users::find_by_email(&pool, &email)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let series = store::test_series::find_by_id(&pool, test_id)
        .await?
        .ok_or(AppError::NotFound("Test not found".to_string()))?;

    let questions = &series.questions.0;
    let answers = answers.into_positional(questions.len());
    let score = score_answers(questions, &answers);
    let status = if score >= series.passing_marks {
        AttemptStatus::Passed
    } else {
        AttemptStatus::Failed
    };
    let trail = build_answer_trail(questions, &answers);

    let updated = store::attempts::finalize_scored(
        &pool,
        user.id,
        series.id,
        score,
        status,
        &trail,
        Utc::now(),
    )
    .await
    .map_err(|e| {
        tracing::error!("Failed to finalize attempt: {:?}", e);
        AppError::Internal(e.to_string())
    })?;

    if updated == 0 {
        return match store::attempts::find(&pool, user.id, series.id).await? {
            None => Err(AppError::NotFound(
                "User has not applied for this test".to_string(),
            )),
            Some(_) => Err(AppError::InvalidState(
                "Test is already submitted".to_string(),
            )),
        };
    }

    let attempt = store::attempts::find(&pool, user.id, series.id)
        .await?
        .ok_or(AppError::Internal("Attempt not found after submit".to_string()))?;

    Ok(Json(json!({
        "message": "Test submitted successfully",
        "score": score,
        "status": status,
        "attempt": attempt,
    })))
}

/// Uploads an answer-paper PDF for an existing attempt (any status)
/// and marks it Submitted. No score is computed; grading is manual.
pub async fn submit_answer_paper(
    State(pool): State<SqlitePool>,
    State(storage): State<StorageClient>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut email: Option<String> = None;
    let mut test_id: Option<i64> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {}", e)))?
    {
        match field.name().unwrap_or_default() {
            "email" => {
                email = Some(read_text_field(field).await?);
            }
            "testId" => {
                let value = read_text_field(field).await?;
                test_id = Some(value.parse().map_err(|_| {
                    AppError::Validation("testId must be a number".to_string())
                })?);
            }
            "file" | "fileUrl" => {
                file = Some(read_pdf_field(field).await?);
            }
            _ => {}
        }
    }

    let email = email.ok_or(AppError::Validation("Email is required".to_string()))?;
    let test_id = test_id.ok_or(AppError::Validation("testId is required".to_string()))?;
    let (file_name, bytes) = file.ok_or(AppError::Validation("File is required".to_string()))?;

    let user = store::users::find_by_email(&pool, &email)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    store::attempts::find(&pool, user.id, test_id)
        .await?
        .ok_or(AppError::NotFound(
            "User has not applied for this test".to_string(),
        ))?;

    let object_name = format!(
        "{}_{}",
        Utc::now().timestamp_millis(),
        sanitize_object_name(&file_name)
    );
    let url = storage
        .put_object(&object_name, bytes, "application/pdf")
        .await?;

    let updated = store::attempts::set_answer_paper(&pool, user.id, test_id, &url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to record answer paper: {:?}", e);
            AppError::Internal(e.to_string())
        })?;

    if updated == 0 {
        // The attempt disappeared between the check and the update; the
        // blob stays behind and is only logged for cleanup.
        tracing::warn!("Orphaned answer paper upload: {}", object_name);
        return Err(AppError::NotFound(
            "User has not applied for this test".to_string(),
        ));
    }

    let attempt = store::attempts::find(&pool, user.id, test_id)
        .await?
        .ok_or(AppError::Internal("Attempt not found after upload".to_string()))?;

    Ok(Json(json!({
        "message": "Answer paper submitted successfully",
        "url": url,
        "attempt": attempt,
    })))
}

/// Raw attempt rows for a user.
pub async fn examinations(
    State(pool): State<SqlitePool>,
    Query(params): Query<UserEmailParams>,
) -> Result<impl IntoResponse, AppError> {
    let user = store::users::find_by_email(&pool, &params.email)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let attempts = store::attempts::list_for_user(&pool, user.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list attempts: {:?}", e);
            AppError::Internal(e.to_string())
        })?;

    Ok(Json(attempts))
}

/// Applied-test listing with series and exam names resolved by two
/// sequential id lookups per attempt. Dangling references degrade to
/// placeholder strings instead of failing the whole response.
pub async fn applied_tests_exams(
    State(pool): State<SqlitePool>,
    Query(params): Query<UserEmailParams>,
) -> Result<impl IntoResponse, AppError> {
    let user = store::users::find_by_email(&pool, &params.email)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let attempts = store::attempts::list_for_user(&pool, user.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list attempts: {:?}", e);
            AppError::Internal(e.to_string())
        })?;

    if attempts.is_empty() {
        return Ok(Json(json!({
            "message": "No tests or exams applied",
            "data": [],
        })));
    }

    let mut applied = Vec::with_capacity(attempts.len());
    for attempt in attempts {
        let series = store::test_series::find_meta_by_id(&pool, attempt.test_series_id).await?;

        let (test_name, subject, exam_name) = match series {
            None => (
                "Unknown Test".to_string(),
                None,
                "Not linked to an exam".to_string(),
            ),
            Some(series) => {
                let exam = store::exams::find_by_id(&pool, series.exam_id).await?;
                let exam_name = exam
                    .map(|e| e.name)
                    .unwrap_or_else(|| "Unknown Exam".to_string());
                (series.exam_name, Some(series.subject), exam_name)
            }
        };

        applied.push(AppliedTest {
            test_id: attempt.test_series_id,
            test_name,
            subject,
            exam_name,
            status: attempt.status,
            score: attempt.score,
            total_marks: attempt.total_marks,
            exam_date: attempt.exam_date,
            answer_paper_url: attempt.answer_paper_url,
        });
    }

    Ok(Json(json!({
        "message": "Successfully retrieved applied tests and exams",
        "totalApplied": applied.len(),
        "data": applied,
    })))
}

/// The public URL of a series' uploaded question paper.
pub async fn question_paper(
    State(pool): State<SqlitePool>,
    Path(test_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let series = store::test_series::find_meta_by_id(&pool, test_id)
        .await?
        .ok_or(AppError::NotFound("Test not found".to_string()))?;

    let url = series.url.ok_or(AppError::NotFound(
        "Question paper not available for this test".to_string(),
    ))?;

    Ok(Json(json!({
        "testId": test_id,
        "url": url,
    })))
}

/// Reads a multipart text field.
pub(super) async fn read_text_field(
    field: axum::extract::multipart::Field<'_>,
) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart field: {}", e)))
}

/// Reads a multipart file field, accepting PDF uploads only.
pub(super) async fn read_pdf_field(
    field: axum::extract::multipart::Field<'_>,
) -> Result<(String, Vec<u8>), AppError> {
    if field.content_type() != Some("application/pdf") {
        return Err(AppError::Validation(
            "Only PDF uploads are accepted".to_string(),
        ));
    }

    let file_name = field.file_name().unwrap_or("document.pdf").to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read upload: {}", e)))?;

    Ok((file_name, bytes.to_vec()))
}
