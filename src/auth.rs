//! Bearer-token auth. Login issues a JWT carrying the user's id, name and
//! role; the `AuthUser` extractor turns it back into a request-scoped
//! principal that every protected handler receives explicitly.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{Role, User};
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub name: String,
    pub role: Role,
    pub exp: usize,
}

/// The authenticated principal for one request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(AppError::forbidden("admin access required"))
        }
    }
}

pub fn issue_token(user: &User, secret: &str, ttl_secs: u64) -> Result<String, AppError> {
    let claims = Claims {
        sub: user.id,
        name: user.name.clone(),
        role: user.role,
        exp: (Utc::now().timestamp() as usize) + ttl_secs as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to sign token: {}", e)))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("invalid or expired token"))
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or_else(|| AppError::unauthorized("missing bearer token"))?;

        let claims = verify_token(token, &state.config.jwt_secret)?;
        Ok(AuthUser {
            id: claims.sub,
            name: claims.name,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Budi Santoso".into(),
            email: "budi@example.ac.id".into(),
            password_hash: String::new(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn token_round_trips_the_principal() {
        let user = sample_user(Role::Student);
        let token = issue_token(&user, "test-secret", 3600).unwrap();
        let claims = verify_token(&token, "test-secret").unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.name, user.name);
        assert_eq!(claims.role, Role::Student);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let user = sample_user(Role::Admin);
        let token = issue_token(&user, "test-secret", 3600).unwrap();
        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn require_admin_rejects_students() {
        let principal = AuthUser {
            id: Uuid::new_v4(),
            name: "x".into(),
            role: Role::Student,
        };
        assert!(principal.require_admin().is_err());

        let principal = AuthUser {
            id: Uuid::new_v4(),
            name: "x".into(),
            role: Role::SuperAdmin,
        };
        assert!(principal.require_admin().is_ok());
    }
}
