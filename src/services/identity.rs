// src/services/identity.rs

use crate::{config::Config, error::AppError};

/// Client for the external identity provider.
///
/// Credentials and sessions live entirely with the provider; this
/// client only creates accounts and resolves session tokens back to
/// the provider's account id.
#[derive(Debug, Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl IdentityClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.identity_api_url.trim_end_matches('/').to_string(),
            secret_key: config.identity_secret_key.clone(),
        }
    }

    /// Creates a provider account and returns its external id.
    pub async fn create_account(&self, email: &str, password: &str) -> Result<String, AppError> {
        let response = self
            .http
            .post(format!("{}/users", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(&serde_json::json!({
                "email_address": [email],
                "password": password,
            }))
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("Identity provider unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Auth(format!(
                "Identity provider rejected signup: {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::Auth(format!("Invalid identity provider response: {}", e)))?;

        body["id"]
            .as_str()
            .map(|id| id.to_string())
            .ok_or_else(|| AppError::Auth("Identity provider returned no account id".to_string()))
    }

    /// Resolves a session token to the provider account id that owns it.
    pub async fn resolve_session(&self, token: &str) -> Result<String, AppError> {
        let response = self
            .http
            .get(format!("{}/sessions/{}", self.base_url, token))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("Identity provider unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Auth("Invalid or expired session".to_string()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::Auth(format!("Invalid identity provider response: {}", e)))?;

        body["user_id"]
            .as_str()
            .map(|id| id.to_string())
            .ok_or_else(|| AppError::Auth("Session carries no user id".to_string()))
    }
}
