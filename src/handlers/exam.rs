// src/handlers/exam.rs

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
    models::exam::{CreateExamRequest, UpdateExamRequest},
    store,
};

/// Creates a new exam under an existing category.
pub async fn create_exam(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::Validation(validation_errors.to_string()));
    }

    store::categories::find_by_id(&pool, payload.category_id)
        .await?
        .ok_or(AppError::NotFound("Category not found".to_string()))?;

    let exam = store::exams::insert(&pool, &payload.name, payload.category_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create exam: {:?}", e);
            AppError::Internal(e.to_string())
        })?;

    Ok((StatusCode::CREATED, Json(exam)))
}

/// Lists all exams with their category name resolved.
pub async fn list_exams(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let exams = store::exams::list_with_category(&pool).await.map_err(|e| {
        tracing::error!("Failed to list exams: {:?}", e);
        AppError::Internal(e.to_string())
    })?;

    Ok(Json(exams))
}

/// Updates an exam's name or category.
pub async fn update_exam(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.is_none() && payload.category_id.is_none() {
        let exam = store::exams::find_by_id(&pool, id)
            .await?
            .ok_or(AppError::NotFound("Exam not found".to_string()))?;
        return Ok(Json(exam));
    }

    if let Some(category_id) = payload.category_id {
        store::categories::find_by_id(&pool, category_id)
            .await?
            .ok_or(AppError::NotFound("Category not found".to_string()))?;
    }

    let updated = store::exams::update(&pool, id, payload.name.as_deref(), payload.category_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update exam: {:?}", e);
            AppError::Internal(e.to_string())
        })?;

    if updated == 0 {
        return Err(AppError::NotFound("Exam not found".to_string()));
    }

    let exam = store::exams::find_by_id(&pool, id)
        .await?
        .ok_or(AppError::NotFound("Exam not found".to_string()))?;

    Ok(Json(exam))
}

/// Deletes an exam. Refused while test series still reference it.
pub async fn delete_exam(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exam = store::exams::find_by_id(&pool, id)
        .await?
        .ok_or(AppError::NotFound("Exam not found".to_string()))?;

    let dependent_series = store::test_series::count_by_exam(&pool, id).await?;
    if dependent_series > 0 {
        return Err(AppError::Conflict(format!(
            "Exam is still referenced by {} test series",
            dependent_series
        )));
    }

    store::exams::delete(&pool, id).await.map_err(|e| {
        tracing::error!("Failed to delete exam: {:?}", e);
        AppError::Internal(e.to_string())
    })?;

    Ok(Json(json!({
        "message": "Exam deleted",
        "exam": exam,
    })))
}
