// src/handlers/question_paper.rs

use axum::{
    Json,
    extract::{Multipart, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    services::storage::{StorageClient, sanitize_object_name},
    store,
};

use super::attempt::{read_pdf_field, read_text_field};

/// Uploads a question-paper PDF and attaches its public URL to a test
/// series. The upload happens first; a series that vanishes before the
/// update leaves an orphaned blob that is only logged.
pub async fn upload_question_paper(
    State(pool): State<SqlitePool>,
    State(storage): State<StorageClient>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut test_series_id: Option<i64> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {}", e)))?
    {
        match field.name().unwrap_or_default() {
            "testSeriesId" => {
                let value = read_text_field(field).await?;
                test_series_id = Some(value.parse().map_err(|_| {
                    AppError::Validation("testSeriesId must be a number".to_string())
                })?);
            }
            "file" | "fileUrl" => {
                file = Some(read_pdf_field(field).await?);
            }
            // title and examId ride along in the form but are not stored.
            _ => {}
        }
    }

    let test_series_id =
        test_series_id.ok_or(AppError::Validation("testSeriesId is required".to_string()))?;
    let (file_name, bytes) = file.ok_or(AppError::Validation("File is required".to_string()))?;

    let object_name = format!(
        "{}_{}",
        Utc::now().timestamp_millis(),
        sanitize_object_name(&file_name)
    );
    let url = storage
        .put_object(&object_name, bytes, "application/pdf")
        .await?;

    let updated = store::test_series::set_url(&pool, test_series_id, &url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to attach question paper: {:?}", e);
            AppError::Internal(e.to_string())
        })?;

    if updated == 0 {
        tracing::warn!("Orphaned question paper upload: {}", object_name);
        return Err(AppError::NotFound(
            "Test not found or not updated".to_string(),
        ));
    }

    Ok(Json(json!({
        "message": "PDF uploaded and Test updated",
        "url": url,
    })))
}
