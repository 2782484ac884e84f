// src/handlers/exam_result.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::exam_result::{ExamResultDetail, ExamResultWithSeries, RecordExamResultRequest},
    services::scoring::grade_of,
    store,
};

const RESULT_STATUSES: [&str; 3] = ["Pending", "Passed", "Failed"];

/// Records a historical exam result for a user. Unlike attempts there
/// is no uniqueness constraint; every call appends a row.
pub async fn record_result(
    State(pool): State<SqlitePool>,
    Path(user_id): Path<i64>,
    Json(payload): Json<RecordExamResultRequest>,
) -> Result<impl IntoResponse, AppError> {
    store::users::find_by_id(&pool, user_id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    store::test_series::find_meta_by_id(&pool, payload.test_series_id)
        .await?
        .ok_or(AppError::NotFound("Test Series not found".to_string()))?;

    let status = payload.status.as_deref().unwrap_or("Pending");
    if !RESULT_STATUSES.contains(&status) {
        return Err(AppError::Validation(format!(
            "Status must be one of: {}",
            RESULT_STATUSES.join(", ")
        )));
    }

    let result = store::exam_results::insert(
        &pool,
        user_id,
        payload.test_series_id,
        payload.score,
        status,
    )
    .await
    .map_err(|e| {
        tracing::error!("Failed to record exam result: {:?}", e);
        AppError::Internal(e.to_string())
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Exam result added successfully",
            "result": result,
        })),
    ))
}

/// Lists a user's recorded results, newest first, each joined with its
/// test series by a follow-up lookup. A deleted series leaves the
/// embedded series null rather than dropping the row.
pub async fn list_results(
    State(pool): State<SqlitePool>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    store::users::find_by_id(&pool, user_id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let results = store::exam_results::list_for_user(&pool, user_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list exam results: {:?}", e);
            AppError::Internal(e.to_string())
        })?;

    let mut rows = Vec::with_capacity(results.len());
    for result in results {
        let test_series =
            store::test_series::find_meta_by_id(&pool, result.test_series_id).await?;
        rows.push(ExamResultWithSeries {
            result,
            test_series,
        });
    }

    Ok(Json(rows))
}

/// The latest result for a user on one series, graded against the
/// series' current total marks.
pub async fn result_detail(
    State(pool): State<SqlitePool>,
    Path((user_id, test_series_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    store::users::find_by_id(&pool, user_id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let result = store::exam_results::find_latest(&pool, user_id, test_series_id)
        .await?
        .ok_or(AppError::NotFound("Result not found".to_string()))?;

    let series = store::test_series::find_meta_by_id(&pool, test_series_id)
        .await?
        .ok_or(AppError::NotFound("Test Series not found".to_string()))?;

    let (percentage, grade) = grade_of(result.score.unwrap_or(0), series.total_marks)?;

    Ok(Json(ExamResultDetail {
        result,
        percentage,
        grade: grade.to_string(),
    }))
}
