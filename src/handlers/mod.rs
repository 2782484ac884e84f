// src/handlers/mod.rs

pub mod attempt;
pub mod auth;
pub mod category;
pub mod exam;
pub mod exam_result;
pub mod question_paper;
pub mod test_series;
pub mod user;
