// src/handlers/test_series.rs

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::test_series::{
        CreateQuestionRequest, CreateTestSeriesRequest, Question, TestSeriesSummary,
        UpdateQuestionRequest, UpdateTestSeriesRequest,
    },
    store,
};

/// Creates a new test series with an empty question list.
pub async fn create_series(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateTestSeriesRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::Validation(validation_errors.to_string()));
    }

    store::categories::find_by_id(&pool, payload.category_id)
        .await?
        .ok_or(AppError::NotFound("Category not found".to_string()))?;
    store::exams::find_by_id(&pool, payload.exam_id)
        .await?
        .ok_or(AppError::NotFound("Exam not found".to_string()))?;

    let series = store::test_series::insert(&pool, &payload).await.map_err(|e| {
        tracing::error!("Failed to create test series: {:?}", e);
        AppError::Internal(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(series)))
}

/// Lists all series as summaries: the question list is excluded, the
/// category name and exam are resolved by id lookup. Dangling ids
/// resolve to null instead of failing the listing.
pub async fn list_series(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let metas = store::test_series::list_meta(&pool).await.map_err(|e| {
        tracing::error!("Failed to list test series: {:?}", e);
        AppError::Internal(e.to_string())
    })?;

    let category_names: HashMap<i64, String> = store::categories::list_all(&pool)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let exam_ids: Vec<i64> = metas.iter().map(|m| m.exam_id).collect();
    let exams: HashMap<i64, _> = store::exams::find_by_ids(&pool, &exam_ids)
        .await?
        .into_iter()
        .map(|e| (e.id, e))
        .collect();

    let summaries: Vec<TestSeriesSummary> = metas
        .into_iter()
        .map(|meta| TestSeriesSummary {
            category_name: category_names.get(&meta.category_id).cloned(),
            exam: exams.get(&meta.exam_id).cloned(),
            meta,
        })
        .collect();

    Ok(Json(summaries))
}

/// Fetches one series with its full question list.
pub async fn get_series(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let series = store::test_series::find_by_id(&pool, id)
        .await?
        .ok_or(AppError::NotFound("Test not found".to_string()))?;

    Ok(Json(series))
}

/// Updates series metadata. The question list and the derived
/// aggregates are not reachable from here.
pub async fn update_series(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTestSeriesRequest>,
) -> Result<impl IntoResponse, AppError> {
    let no_fields = payload.subject.is_none()
        && payload.exam_name.is_none()
        && payload.duration.is_none()
        && payload.passing_marks.is_none()
        && payload.description.is_none()
        && payload.url.is_none()
        && payload.category_id.is_none()
        && payload.exam_id.is_none();

    if !no_fields {
        if let Some(category_id) = payload.category_id {
            store::categories::find_by_id(&pool, category_id)
                .await?
                .ok_or(AppError::NotFound("Category not found".to_string()))?;
        }
        if let Some(exam_id) = payload.exam_id {
            store::exams::find_by_id(&pool, exam_id)
                .await?
                .ok_or(AppError::NotFound("Exam not found".to_string()))?;
        }

        let updated = store::test_series::update_meta(&pool, id, &payload)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update test series: {:?}", e);
                AppError::Internal(e.to_string())
            })?;

        if updated == 0 {
            return Err(AppError::NotFound("Test not found".to_string()));
        }
    }

    let series = store::test_series::find_by_id(&pool, id)
        .await?
        .ok_or(AppError::NotFound("Test not found".to_string()))?;

    Ok(Json(series))
}

/// Deletes a series. Attempts that reference it stay behind and
/// degrade to placeholder names in reporting.
pub async fn delete_series(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let series = store::test_series::find_by_id(&pool, id)
        .await?
        .ok_or(AppError::NotFound("Test not found".to_string()))?;

    store::test_series::delete(&pool, id).await.map_err(|e| {
        tracing::error!("Failed to delete test series: {:?}", e);
        AppError::Internal(e.to_string())
    })?;

    Ok(Json(json!({
        "message": "Test deleted successfully",
        "test": series,
    })))
}

/// Appends a question to a series.
///
/// The question id comes from the series' monotonic counter and the
/// aggregate columns are re-derived from the new list.
pub async fn add_question(
    State(pool): State<SqlitePool>,
    Path(series_id): Path<i64>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::Validation(validation_errors.to_string()));
    }

    let mut series = store::test_series::find_by_id(&pool, series_id)
        .await?
        .ok_or(AppError::NotFound("Test not found".to_string()))?;

    let question = Question {
        id: series.next_question_id,
        question: payload.question,
        correct_answer: payload.correct_answer,
        options: payload.options,
        marks: payload.marks,
        image_url: payload.image_url,
    };
    series.questions.0.push(question);

    store::test_series::save_questions(
        &pool,
        series_id,
        &series.questions.0,
        series.next_question_id + 1,
    )
    .await
    .map_err(|e| {
        tracing::error!("Failed to add question: {:?}", e);
        AppError::Internal(e.to_string())
    })?;

    let series = store::test_series::find_by_id(&pool, series_id)
        .await?
        .ok_or(AppError::NotFound("Test not found".to_string()))?;

    Ok(Json(series))
}

/// Lists all questions of a series.
pub async fn list_questions(
    State(pool): State<SqlitePool>,
    Path(series_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let series = store::test_series::find_by_id(&pool, series_id)
        .await?
        .ok_or(AppError::NotFound("Test not found".to_string()))?;

    Ok(Json(series.questions.0))
}

/// Fetches one question of a series.
pub async fn get_question(
    State(pool): State<SqlitePool>,
    Path((series_id, question_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let series = store::test_series::find_by_id(&pool, series_id)
        .await?
        .ok_or(AppError::NotFound("Test not found".to_string()))?;

    let question = series
        .questions
        .0
        .into_iter()
        .find(|q| q.id == question_id)
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    Ok(Json(question))
}

/// Patches a question, then recomputes `total_marks` as the full sum
/// over all questions rather than an incremental delta.
pub async fn update_question(
    State(pool): State<SqlitePool>,
    Path((series_id, question_id)): Path<(i64, i64)>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(options) = &payload.options {
        if options.is_empty() {
            return Err(AppError::Validation(
                "Options cannot be empty".to_string(),
            ));
        }
    }
    if let Some(marks) = payload.marks {
        if marks < 0 {
            return Err(AppError::Validation("Marks cannot be negative".to_string()));
        }
    }

    let mut series = store::test_series::find_by_id(&pool, series_id)
        .await?
        .ok_or(AppError::NotFound("Test not found".to_string()))?;

    let question = series
        .questions
        .0
        .iter_mut()
        .find(|q| q.id == question_id)
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    if let Some(text) = payload.question {
        question.question = text;
    }
    if let Some(correct_answer) = payload.correct_answer {
        question.correct_answer = correct_answer;
    }
    if let Some(options) = payload.options {
        question.options = options;
    }
    if let Some(marks) = payload.marks {
        question.marks = marks;
    }
    if let Some(image_url) = payload.image_url {
        question.image_url = Some(image_url);
    }
    let updated = question.clone();

    store::test_series::save_questions(
        &pool,
        series_id,
        &series.questions.0,
        series.next_question_id,
    )
    .await
    .map_err(|e| {
        tracing::error!("Failed to update question: {:?}", e);
        AppError::Internal(e.to_string())
    })?;

    Ok(Json(json!({
        "message": "Question updated successfully",
        "question": updated,
    })))
}

/// Removes a question and re-derives the aggregate columns.
pub async fn delete_question(
    State(pool): State<SqlitePool>,
    Path((series_id, question_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let mut series = store::test_series::find_by_id(&pool, series_id)
        .await?
        .ok_or(AppError::NotFound("Test not found".to_string()))?;

    let before = series.questions.0.len();
    series.questions.0.retain(|q| q.id != question_id);
    if series.questions.0.len() == before {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    store::test_series::save_questions(
        &pool,
        series_id,
        &series.questions.0,
        series.next_question_id,
    )
    .await
    .map_err(|e| {
        tracing::error!("Failed to delete question: {:?}", e);
        AppError::Internal(e.to_string())
    })?;

    Ok(Json(json!({
        "message": "Question deleted successfully",
    })))
}
