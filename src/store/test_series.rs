// src/store/test_series.rs

use chrono::Utc;
use sqlx::{SqlitePool, types::Json};

use crate::models::test_series::{
    CreateTestSeriesRequest, Question, TestSeries, TestSeriesMeta, UpdateTestSeriesRequest,
};

const SERIES_COLUMNS: &str = "id, subject, exam_name, number_of_questions, duration, \
     passing_marks, total_marks, description, url, category_id, exam_id, \
     questions, next_question_id, created_at";

const META_COLUMNS: &str = "id, subject, exam_name, number_of_questions, duration, \
     passing_marks, total_marks, description, url, category_id, exam_id, created_at";

/// Inserts a new series with an empty question list. The derived
/// aggregates always start at zero; they are never taken from input.
pub async fn insert(
    pool: &SqlitePool,
    payload: &CreateTestSeriesRequest,
) -> Result<TestSeries, sqlx::Error> {
    sqlx::query_as::<_, TestSeries>(&format!(
        r#"
        INSERT INTO test_series
        (subject, exam_name, number_of_questions, duration, passing_marks, total_marks,
         description, url, category_id, exam_id, questions, next_question_id, created_at)
        VALUES (?, ?, 0, ?, ?, 0, ?, ?, ?, ?, '[]', 1, ?)
        RETURNING {SERIES_COLUMNS}
        "#
    ))
    .bind(&payload.subject)
    .bind(&payload.exam_name)
    .bind(payload.duration)
    .bind(payload.passing_marks)
    .bind(&payload.description)
    .bind(&payload.url)
    .bind(payload.category_id)
    .bind(payload.exam_id)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
}

/// Summary listing: every series without its question list.
pub async fn list_meta(pool: &SqlitePool) -> Result<Vec<TestSeriesMeta>, sqlx::Error> {
    sqlx::query_as::<_, TestSeriesMeta>(&format!(
        "SELECT {META_COLUMNS} FROM test_series ORDER BY id DESC"
    ))
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<TestSeries>, sqlx::Error> {
    sqlx::query_as::<_, TestSeries>(&format!(
        "SELECT {SERIES_COLUMNS} FROM test_series WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn find_meta_by_id(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<TestSeriesMeta>, sqlx::Error> {
    sqlx::query_as::<_, TestSeriesMeta>(&format!(
        "SELECT {META_COLUMNS} FROM test_series WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Looks a series up by its exam name (first match by id).
pub async fn find_by_exam_name(
    pool: &SqlitePool,
    exam_name: &str,
) -> Result<Option<TestSeries>, sqlx::Error> {
    sqlx::query_as::<_, TestSeries>(&format!(
        "SELECT {SERIES_COLUMNS} FROM test_series WHERE exam_name = ? ORDER BY id LIMIT 1"
    ))
    .bind(exam_name)
    .fetch_optional(pool)
    .await
}

/// Metadata-only update: the question list and its derived aggregates
/// can only change through `save_questions`.
pub async fn update_meta(
    pool: &SqlitePool,
    id: i64,
    payload: &UpdateTestSeriesRequest,
) -> Result<u64, sqlx::Error> {
    let mut builder: sqlx::QueryBuilder<sqlx::Sqlite> =
        sqlx::QueryBuilder::new("UPDATE test_series SET ");
    let mut separated = builder.separated(", ");

    if let Some(subject) = &payload.subject {
        separated.push("subject = ");
        separated.push_bind_unseparated(subject);
    }
    if let Some(exam_name) = &payload.exam_name {
        separated.push("exam_name = ");
        separated.push_bind_unseparated(exam_name);
    }
    if let Some(duration) = payload.duration {
        separated.push("duration = ");
        separated.push_bind_unseparated(duration);
    }
    if let Some(passing_marks) = payload.passing_marks {
        separated.push("passing_marks = ");
        separated.push_bind_unseparated(passing_marks);
    }
    if let Some(description) = &payload.description {
        separated.push("description = ");
        separated.push_bind_unseparated(description);
    }
    if let Some(url) = &payload.url {
        separated.push("url = ");
        separated.push_bind_unseparated(url);
    }
    if let Some(category_id) = payload.category_id {
        separated.push("category_id = ");
        separated.push_bind_unseparated(category_id);
    }
    if let Some(exam_id) = payload.exam_id {
        separated.push("exam_id = ");
        separated.push_bind_unseparated(exam_id);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);

    let result = builder.build().execute(pool).await?;
    Ok(result.rows_affected())
}

/// Writes back a series' question list and re-derives the aggregate
/// columns from it, so `total_marks == Σ marks` and
/// `number_of_questions == len(questions)` hold after every mutation.
pub async fn save_questions(
    pool: &SqlitePool,
    id: i64,
    questions: &[Question],
    next_question_id: i64,
) -> Result<u64, sqlx::Error> {
    let total_marks: i64 = questions.iter().map(|q| q.marks).sum();
    let number_of_questions = questions.len() as i64;

    let result = sqlx::query(
        r#"
        UPDATE test_series
        SET questions = ?, number_of_questions = ?, total_marks = ?, next_question_id = ?
        WHERE id = ?
        "#,
    )
    .bind(Json(questions))
    .bind(number_of_questions)
    .bind(total_marks)
    .bind(next_question_id)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Records the public URL of the uploaded question paper.
pub async fn set_url(pool: &SqlitePool, id: i64, url: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE test_series SET url = ? WHERE id = ?")
        .bind(url)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM test_series WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Number of series referencing a category (delete guard).
pub async fn count_by_category(pool: &SqlitePool, category_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM test_series WHERE category_id = ?")
        .bind(category_id)
        .fetch_one(pool)
        .await
}

/// Number of series referencing an exam (delete guard).
pub async fn count_by_exam(pool: &SqlitePool, exam_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM test_series WHERE exam_id = ?")
        .bind(exam_id)
        .fetch_one(pool)
        .await
}
