// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'users' table in the database.
///
/// Credentials live with the identity provider; this row only mirrors
/// the provider's account id plus the profile fields this service owns.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,

    /// Account id assigned by the identity provider.
    pub external_auth_id: String,

    pub email: String,

    pub name: Option<String>,

    pub profile_image: Option<String>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for user signup. The password is forwarded to the identity
/// provider and never stored locally.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(email(message = "Invalid email format."))]
    pub email: String,
    #[validate(length(
        min = 8,
        max = 128,
        message = "Password length must be between 8 and 128 characters."
    ))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
}

/// DTO for login: the client authenticates against the identity
/// provider directly and hands us the resulting session token.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Token cannot be empty."))]
    pub token: String,
}

/// DTO for updating a user's profile. Fields are optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub profile_image: Option<String>,
}

/// Query parameters for the paginated student listing.
#[derive(Debug, Deserialize)]
pub struct StudentListParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}
