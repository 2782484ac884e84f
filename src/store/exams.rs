// src/store/exams.rs

use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::exam::{Exam, ExamWithCategory};

pub async fn insert(pool: &SqlitePool, name: &str, category_id: i64) -> Result<Exam, sqlx::Error> {
    sqlx::query_as::<_, Exam>(
        r#"
        INSERT INTO exams (name, category_id, created_at)
        VALUES (?, ?, ?)
        RETURNING id, name, category_id, created_at
        "#,
    )
    .bind(name)
    .bind(category_id)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
}

/// Lists all exams with their category name resolved. Exams whose
/// category was deleted still appear, with a null category name.
pub async fn list_with_category(pool: &SqlitePool) -> Result<Vec<ExamWithCategory>, sqlx::Error> {
    sqlx::query_as::<_, ExamWithCategory>(
        r#"
        SELECT e.id, e.name, e.category_id, c.name AS category_name, e.created_at
        FROM exams e
        LEFT JOIN categories c ON c.id = e.category_id
        ORDER BY e.id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>("SELECT id, name, category_id, created_at FROM exams WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Fetches the exams matching any of the given ids (dynamic IN clause).
pub async fn find_by_ids(pool: &SqlitePool, ids: &[i64]) -> Result<Vec<Exam>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder: sqlx::QueryBuilder<sqlx::Sqlite> =
        sqlx::QueryBuilder::new("SELECT id, name, category_id, created_at FROM exams WHERE id IN (");
    let mut separated = builder.separated(",");
    for id in ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(")");

    builder.build_query_as().fetch_all(pool).await
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    name: Option<&str>,
    category_id: Option<i64>,
) -> Result<u64, sqlx::Error> {
    let mut builder: sqlx::QueryBuilder<sqlx::Sqlite> = sqlx::QueryBuilder::new("UPDATE exams SET ");
    let mut separated = builder.separated(", ");

    if let Some(name) = name {
        separated.push("name = ");
        separated.push_bind_unseparated(name);
    }
    if let Some(category_id) = category_id {
        separated.push("category_id = ");
        separated.push_bind_unseparated(category_id);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);

    let result = builder.build().execute(pool).await?;
    Ok(result.rows_affected())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM exams WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Number of exams referencing a category (delete guard).
pub async fn count_by_category(pool: &SqlitePool, category_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM exams WHERE category_id = ?")
        .bind(category_id)
        .fetch_one(pool)
        .await
}
