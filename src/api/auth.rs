use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::auth::issue_token;
use crate::errors::AppError;
use crate::models::user::{LoginRequest, RegisterRequest, Role};
use crate::AppState;

/// POST /api/v1/auth/register — self-service signup, always a STUDENT.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let name = payload.name.trim();
    let email = payload.email.trim().to_lowercase();

    if name.is_empty() || email.is_empty() {
        return Err(AppError::validation("name and email are required"));
    }
    if !email.contains('@') {
        return Err(AppError::validation("invalid email address"));
    }
    if payload.password.len() < 6 {
        return Err(AppError::validation("password must be at least 6 characters"));
    }
    if state.db.email_taken(&email, None).await? {
        return Err(AppError::validation("email is already registered"));
    }

    let hash = bcrypt::hash(&payload.password, state.config.bcrypt_cost)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing failed: {}", e)))?;

    let user = state
        .db
        .insert_user(name, &email, &hash, Role::Student)
        .await?;

    tracing::info!(user_id = %user.id, "registered new student account");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "role": user.role,
        })),
    ))
}

/// POST /api/v1/auth/login — verifies the password, returns a bearer token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let email = payload.email.trim().to_lowercase();

    let user = state
        .db
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| AppError::unauthorized("invalid email or password"))?;

    let ok = bcrypt::verify(&payload.password, &user.password_hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password verification failed: {}", e)))?;
    if !ok {
        return Err(AppError::unauthorized("invalid email or password"));
    }

    let token = issue_token(&user, &state.config.jwt_secret, state.config.token_ttl_secs)?;

    Ok(Json(json!({
        "token": token,
        "user": {
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "role": user.role,
        }
    })))
}
