// JWT session tokens
// Decision: Use HS256 algorithm for simplicity (symmetric key)
// Decision: Claims keep the `email` / `userId` names existing clients decode

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::config::JwtConfig;

/// Claims carried by a session token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub email: String,
    /// User id as a string; parsed where it is used
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// JWT service for token generation and validation
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issue a session token for a user
    pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::from_std(self.config.token_lifetime)?;

        let claims = SessionClaims {
            email: email.to_string(),
            user_id: user_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .context("Failed to encode session token")
    }

    /// Validate signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<SessionClaims> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .context("Invalid session token")?;

        Ok(token_data.claims)
    }
}
