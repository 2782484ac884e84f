// src/handlers/user.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        attempt::AttemptReport,
        user::{StudentListParams, UpdateUserRequest},
    },
    services::scoring::grade_of,
    store,
};

/// Lists all students.
pub async fn list_students(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let students = store::users::list_all(&pool).await.map_err(|e| {
        tracing::error!("Failed to list students: {:?}", e);
        AppError::Internal(e.to_string())
    })?;

    Ok(Json(students))
}

/// Paginated student listing, newest first.
pub async fn list_students_paginated(
    State(pool): State<SqlitePool>,
    Query(params): Query<StudentListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, 100);
    // An out-of-range page lands on an empty page instead of wrapping.
    let offset = page.saturating_sub(1).saturating_mul(limit);

    let total_students = store::users::count(&pool).await.map_err(|e| {
        tracing::error!("Failed to count students: {:?}", e);
        AppError::Internal(e.to_string())
    })?;

    let students = store::users::page(&pool, limit, offset).await.map_err(|e| {
        tracing::error!("Failed to list students: {:?}", e);
        AppError::Internal(e.to_string())
    })?;

    let total_pages = (total_students + limit - 1) / limit;

    Ok(Json(json!({
        "currentPage": page,
        "totalPages": total_pages,
        "totalStudents": total_students,
        "students": students,
    })))
}

/// Updates a user's profile fields.
pub async fn update_user(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    store::users::find_by_id(&pool, id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    // Perform updates sequentially if fields are present
    if let Some(email) = payload.email {
        store::users::update_email(&pool, id, &email)
            .await
            .map_err(|e| {
                if store::is_unique_violation(&e) {
                    AppError::Conflict(format!("Email '{}' is already registered", email))
                } else {
                    tracing::error!("Failed to update user email: {:?}", e);
                    AppError::Internal(e.to_string())
                }
            })?;
    }

    if let Some(name) = payload.name {
        store::users::update_name(&pool, id, &name)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
    }

    if let Some(profile_image) = payload.profile_image {
        store::users::update_profile_image(&pool, id, &profile_image)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
    }

    let user = store::users::find_by_id(&pool, id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Deletes a user.
pub async fn delete_user(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user = store::users::find_by_id(&pool, id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    store::users::delete(&pool, id).await.map_err(|e| {
        tracing::error!("Failed to delete user: {:?}", e);
        AppError::Internal(e.to_string())
    })?;

    Ok(Json(json!({
        "message": "User deleted successfully",
        "user": user,
    })))
}

/// Formatted score report for one student.
///
/// Each attempt is joined with its series by id lookup; a deleted
/// series reports as "Unknown Test". Unscored attempts (and attempts
/// carrying no marks to divide by) report percentage and grade as null.
pub async fn user_exams(
    State(pool): State<SqlitePool>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user = store::users::find_by_id(&pool, user_id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let attempts = store::attempts::list_for_user(&pool, user_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list attempts: {:?}", e);
            AppError::Internal(e.to_string())
        })?;

    let mut exams = Vec::with_capacity(attempts.len());
    for attempt in attempts {
        let series = store::test_series::find_meta_by_id(&pool, attempt.test_series_id).await?;
        let test_name = series
            .map(|s| s.exam_name)
            .unwrap_or_else(|| "Unknown Test".to_string());

        let (percentage, grade) = match attempt.score {
            Some(score) if attempt.total_marks > 0 => {
                let (percentage, grade) = grade_of(score, attempt.total_marks)?;
                (Some(percentage), Some(grade.to_string()))
            }
            _ => (None, None),
        };

        exams.push(AttemptReport {
            test_id: attempt.test_series_id,
            test_name,
            status: attempt.status,
            score: attempt.score,
            total_marks: attempt.total_marks,
            percentage,
            grade,
            exam_date: attempt.exam_date,
        });
    }

    Ok(Json(json!({
        "studentName": user.name,
        "studentEmail": user.email,
        "studentId": user.id,
        "exams": exams,
    })))
}
