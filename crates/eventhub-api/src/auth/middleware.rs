// Authentication extractor
// Decision: Accept the raw token or `Bearer <token>` in the Authorization header
// Decision: Rejections use the same `{"message": ...}` body as every other error

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use eventhub_core::{AuthFailure, Error};
use std::sync::Arc;

use super::{config::AuthConfig, jwt::JwtService};
use crate::api::common::ApiError;

/// Authenticated caller extracted from the session token
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// User id exactly as carried in the token
    pub user_id: String,
    pub email: String,
}

/// Auth state shared across routes
#[derive(Clone)]
pub struct AuthState {
    pub jwt_service: Arc<JwtService>,
}

impl AuthState {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            jwt_service: Arc::new(JwtService::new(config.jwt)),
        }
    }
}

/// Extractor for authenticated user
/// This is required - returns 401 if not authenticated
#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        extract_auth_user(parts, &auth_state).map_err(ApiError::from)
    }
}

fn extract_auth_user(parts: &Parts, auth_state: &AuthState) -> Result<AuthUser, Error> {
    let token = bearer_token(parts)?;

    let claims = auth_state.jwt_service.verify(token).map_err(|e| {
        tracing::debug!("Session token rejected: {:#}", e);
        Error::Auth(AuthFailure::InvalidToken)
    })?;

    Ok(AuthUser {
        user_id: claims.user_id,
        email: claims.email,
    })
}

/// Token from the Authorization header, with or without the Bearer scheme
fn bearer_token(parts: &Parts) -> Result<&str, Error> {
    let value = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or(Error::Auth(AuthFailure::MissingToken))?
        .to_str()
        .map_err(|_| Error::Auth(AuthFailure::InvalidToken))?
        .trim();

    let token = match value.strip_prefix("Bearer") {
        Some(rest) if rest.is_empty() || rest.starts_with(' ') => rest.trim(),
        _ => value,
    };
    if token.is_empty() {
        return Err(Error::Auth(AuthFailure::MissingToken));
    }
    Ok(token)
}
