// src/store/attempts.rs

use chrono::{DateTime, Utc};
use sqlx::{SqlitePool, types::Json};

use crate::models::attempt::{Attempt, AttemptAnswer, AttemptStatus};

const ATTEMPT_COLUMNS: &str = "id, user_id, test_series_id, total_marks, score, status, \
     exam_date, answer_paper_url, answers, descriptive_total, descriptive_attempted, \
     descriptive_score, created_at, updated_at";

pub async fn find(
    pool: &SqlitePool,
    user_id: i64,
    test_series_id: i64,
) -> Result<Option<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "SELECT {ATTEMPT_COLUMNS} FROM attempts WHERE user_id = ? AND test_series_id = ?"
    ))
    .bind(user_id)
    .bind(test_series_id)
    .fetch_optional(pool)
    .await
}

pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "SELECT {ATTEMPT_COLUMNS} FROM attempts WHERE user_id = ? ORDER BY id"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Creates a fresh Pending attempt for (user, series). The unique index
/// on that pair turns a concurrent duplicate apply into a unique
/// violation instead of a second row.
pub async fn insert_pending(
    pool: &SqlitePool,
    user_id: i64,
    test_series_id: i64,
    total_marks: i64,
) -> Result<Attempt, sqlx::Error> {
    let now = Utc::now();
    sqlx::query_as::<_, Attempt>(&format!(
        r#"
        INSERT INTO attempts
        (user_id, test_series_id, total_marks, score, status, exam_date, answer_paper_url,
         answers, descriptive_total, descriptive_attempted, descriptive_score,
         created_at, updated_at)
        VALUES (?, ?, ?, NULL, 'Pending', NULL, NULL, '[]', 0, 0, 0, ?, ?)
        RETURNING {ATTEMPT_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(test_series_id)
    .bind(total_marks)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
}

/// Re-apply: puts a graded or submitted attempt back to Pending,
/// clearing its score, answer trail and exam date. The answer-paper
/// URL survives a reset.
pub async fn reset_to_pending(
    pool: &SqlitePool,
    id: i64,
    total_marks: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE attempts
        SET total_marks = ?, score = NULL, status = 'Pending', exam_date = NULL,
            answers = '[]', updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(total_marks)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Single-writer transition out of Pending: the `status = 'Pending'`
/// predicate makes this a compare-and-swap, so of two concurrent
/// submissions exactly one changes the row. Returns the number of rows
/// affected (0 means the attempt was not Pending anymore, or absent).
pub async fn finalize_scored(
    pool: &SqlitePool,
    user_id: i64,
    test_series_id: i64,
    score: i64,
    status: AttemptStatus,
    answers: &[AttemptAnswer],
    exam_date: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE attempts
        SET score = ?, status = ?, answers = ?, exam_date = ?, updated_at = ?
        WHERE user_id = ? AND test_series_id = ? AND status = 'Pending'
        "#,
    )
    .bind(score)
    .bind(status)
    .bind(Json(answers))
    .bind(exam_date)
    .bind(Utc::now())
    .bind(user_id)
    .bind(test_series_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Records an uploaded answer paper. Works from any status; the exam
/// date is only stamped when it was previously unset.
pub async fn set_answer_paper(
    pool: &SqlitePool,
    user_id: i64,
    test_series_id: i64,
    url: &str,
) -> Result<u64, sqlx::Error> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        UPDATE attempts
        SET answer_paper_url = ?, status = 'Submitted',
            exam_date = COALESCE(exam_date, ?), updated_at = ?
        WHERE user_id = ? AND test_series_id = ?
        "#,
    )
    .bind(url)
    .bind(now)
    .bind(now)
    .bind(user_id)
    .bind(test_series_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
