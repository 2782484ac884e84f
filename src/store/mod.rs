// src/store/mod.rs
//
// Thin data-access layer over the SQLite pool. Handlers own error
// mapping and logging; these functions only run queries.

pub mod attempts;
pub mod categories;
pub mod exam_results;
pub mod exams;
pub mod test_series;
pub mod users;

/// True when the error is a unique-index violation (duplicate email,
/// concurrent duplicate apply).
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}
