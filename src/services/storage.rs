// src/services/storage.rs

use url::Url;

use crate::{config::Config, error::AppError};

/// Client for the external object store holding question and answer
/// paper PDFs. Uploads go to a single configured bucket; objects are
/// addressed by name and publicly readable once stored.
#[derive(Debug, Clone)]
pub struct StorageClient {
    http: reqwest::Client,
    base_url: Url,
    service_key: String,
    bucket: String,
}

impl StorageClient {
    pub fn new(config: &Config) -> Self {
        // Url::join treats the last path segment as a file unless the
        // base ends with a slash.
        let mut base = config.storage_api_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).expect("STORAGE_API_URL must be a valid URL");

        Self {
            http: reqwest::Client::new(),
            base_url,
            service_key: config.storage_service_key.clone(),
            bucket: config.storage_bucket.clone(),
        }
    }

    /// Uploads a blob under `name` and returns its public URL.
    pub async fn put_object(
        &self,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, AppError> {
        let upload_url = self
            .base_url
            .join(&format!("storage/v1/object/{}/{}", self.bucket, name))
            .map_err(|e| AppError::Storage(format!("Invalid object name '{}': {}", name, e)))?;

        let response = self
            .http
            .post(upload_url)
            .bearer_auth(&self.service_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Object store unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Storage(format!(
                "Object store returned {}",
                response.status()
            )));
        }

        let public_url = self
            .base_url
            .join(&format!(
                "storage/v1/object/public/{}/{}",
                self.bucket, name
            ))
            .map_err(|e| AppError::Storage(format!("Invalid object name '{}': {}", name, e)))?;

        Ok(public_url.to_string())
    }
}

/// Normalizes a client-supplied file name into a safe object name.
/// Anything outside `[A-Za-z0-9._-]` becomes an underscore.
pub fn sanitize_object_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
