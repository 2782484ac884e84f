// src/store/categories.rs

use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::category::Category;

pub async fn insert(pool: &SqlitePool, name: &str) -> Result<Category, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (name, created_at)
        VALUES (?, ?)
        RETURNING id, name, created_at
        "#,
    )
    .bind(name)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
}

pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>("SELECT id, name, created_at FROM categories ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>("SELECT id, name, created_at FROM categories WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Returns the number of rows changed (0 when the id is unknown).
pub async fn update_name(pool: &SqlitePool, id: i64, name: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE categories SET name = ? WHERE id = ?")
        .bind(name)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
