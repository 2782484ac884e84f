// src/store/exam_results.rs

use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::exam_result::ExamResult;

const RESULT_COLUMNS: &str = "id, user_id, test_series_id, score, status, attempted_at";

pub async fn insert(
    pool: &SqlitePool,
    user_id: i64,
    test_series_id: i64,
    score: Option<i64>,
    status: &str,
) -> Result<ExamResult, sqlx::Error> {
    sqlx::query_as::<_, ExamResult>(&format!(
        r#"
        INSERT INTO exam_results (user_id, test_series_id, score, status, attempted_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING {RESULT_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(test_series_id)
    .bind(score)
    .bind(status)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
}

pub async fn list_for_user(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<ExamResult>, sqlx::Error> {
    sqlx::query_as::<_, ExamResult>(&format!(
        "SELECT {RESULT_COLUMNS} FROM exam_results WHERE user_id = ? ORDER BY attempted_at DESC, id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Latest recorded result for (user, series).
pub async fn find_latest(
    pool: &SqlitePool,
    user_id: i64,
    test_series_id: i64,
) -> Result<Option<ExamResult>, sqlx::Error> {
    sqlx::query_as::<_, ExamResult>(&format!(
        r#"
        SELECT {RESULT_COLUMNS} FROM exam_results
        WHERE user_id = ? AND test_series_id = ?
        ORDER BY id DESC LIMIT 1
        "#
    ))
    .bind(user_id)
    .bind(test_series_id)
    .fetch_optional(pool)
    .await
}
