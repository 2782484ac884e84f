// src/services/mod.rs

pub mod identity;
pub mod scoring;
pub mod storage;
