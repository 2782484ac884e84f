// src/models/mod.rs

pub mod attempt;
pub mod category;
pub mod exam;
pub mod exam_result;
pub mod test_series;
pub mod user;
