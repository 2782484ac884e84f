// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::user::{LoginRequest, SignupRequest},
    services::identity::IdentityClient,
    store,
};

/// Registers a new user.
///
/// The account is created at the identity provider first; the local
/// shadow record is then stored keyed by the provider's id. Passwords
/// never touch the database.
pub async fn signup(
    State(pool): State<SqlitePool>,
    State(identity): State<IdentityClient>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::Validation(validation_errors.to_string()));
    }

    let external_id = identity
        .create_account(&payload.email, &payload.password)
        .await?;

    let user = store::users::insert(&pool, &external_id, &payload.email, payload.name.as_deref())
        .await
        .map_err(|e| {
            if store::is_unique_violation(&e) {
                AppError::Conflict(format!("Email '{}' is already registered", payload.email))
            } else {
                tracing::error!("Failed to store user: {:?}", e);
                AppError::from(e)
            }
        })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Signup successful",
            "externalId": user.external_auth_id,
        })),
    ))
}

/// Validates a session token with the identity provider and returns
/// the matching local user.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(identity): State<IdentityClient>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::Validation(validation_errors.to_string()));
    }

    let external_id = identity.resolve_session(&payload.token).await?;

    let user = store::users::find_by_external_id(&pool, &external_id)
        .await
        .map_err(|e| {
            tracing::error!("Login DB error: {:?}", e);
            AppError::Internal(e.to_string())
        })?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(json!({
        "message": "Login successful",
        "user": user,
    })))
}
