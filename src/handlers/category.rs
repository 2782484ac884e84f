// src/handlers/category.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{error::AppError, models::category::CategoryRequest, store};

/// Creates a new category.
pub async fn create_category(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::Validation(validation_errors.to_string()));
    }

    let category = store::categories::insert(&pool, &payload.name)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create category: {:?}", e);
            AppError::Internal(e.to_string())
        })?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// Lists all categories.
pub async fn list_categories(
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, AppError> {
    let categories = store::categories::list_all(&pool).await.map_err(|e| {
        tracing::error!("Failed to list categories: {:?}", e);
        AppError::Internal(e.to_string())
    })?;

    Ok(Json(categories))
}

/// Renames a category.
pub async fn update_category(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::Validation(validation_errors.to_string()));
    }

    let updated = store::categories::update_name(&pool, id, &payload.name)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update category: {:?}", e);
            AppError::Internal(e.to_string())
        })?;

    if updated == 0 {
        return Err(AppError::NotFound("Category not found".to_string()));
    }

    let category = store::categories::find_by_id(&pool, id)
        .await?
        .ok_or(AppError::NotFound("Category not found".to_string()))?;

    Ok(Json(category))
}

/// Deletes a category.
///
/// Refused while exams or test series still reference it, so the
/// taxonomy cannot be left dangling from this side.
pub async fn delete_category(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let category = store::categories::find_by_id(&pool, id)
        .await?
        .ok_or(AppError::NotFound("Category not found".to_string()))?;

    let dependent_exams = store::exams::count_by_category(&pool, id).await?;
    let dependent_series = store::test_series::count_by_category(&pool, id).await?;
    if dependent_exams > 0 || dependent_series > 0 {
        return Err(AppError::Conflict(format!(
            "Category is still referenced by {} exam(s) and {} test series",
            dependent_exams, dependent_series
        )));
    }

    store::categories::delete(&pool, id).await.map_err(|e| {
        tracing::error!("Failed to delete category: {:?}", e);
        AppError::Internal(e.to_string())
    })?;

    Ok(Json(json!({
        "message": "Category deleted",
        "category": category,
    })))
}
