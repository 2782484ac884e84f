// src/config.rs

use std::env;
use dotenvy::dotenv;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,

    /// Base URL of the external identity provider (signup/session API).
    pub identity_api_url: String,
    pub identity_secret_key: String,

    /// Base URL of the object store holding question/answer papers.
    pub storage_api_url: String,
    pub storage_service_key: String,
    pub storage_bucket: String,

    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5000);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let identity_api_url = env::var("IDENTITY_API_URL")
            .expect("IDENTITY_API_URL must be set");

        let identity_secret_key = env::var("IDENTITY_SECRET_KEY")
            .expect("IDENTITY_SECRET_KEY must be set");

        let storage_api_url = env::var("STORAGE_API_URL")
            .expect("STORAGE_API_URL must be set");

        let storage_service_key = env::var("STORAGE_SERVICE_KEY")
            .expect("STORAGE_SERVICE_KEY must be set");

        let storage_bucket = env::var("STORAGE_BUCKET")
            .unwrap_or_else(|_| "documents".to_string());

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            database_url,
            port,
            rust_log,
            identity_api_url,
            identity_secret_key,
            storage_api_url,
            storage_service_key,
            storage_bucket,
            allowed_origins,
        }
    }
}
