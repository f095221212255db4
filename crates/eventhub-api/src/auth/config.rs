// Authentication configuration loaded from environment variables.
// Decision: AUTH_ prefix for all auth config
// Decision: Without AUTH_JWT_SECRET a random per-process secret is generated

use rand::Rng;
use std::time::Duration;

/// Session token lifetime used when AUTH_TOKEN_LIFETIME is unset
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(2 * 60 * 60);

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWTs
    pub secret: String,
    /// Session token lifetime
    pub token_lifetime: Duration,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: generate_secret(),
            token_lifetime: DEFAULT_TOKEN_LIFETIME,
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub jwt: JwtConfig,
}

impl AuthConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let secret = std::env::var("AUTH_JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| {
                tracing::warn!(
                    "AUTH_JWT_SECRET not set, using a random secret; tokens will not survive a restart"
                );
                generate_secret()
            });

        let token_lifetime = std::env::var("AUTH_TOKEN_LIFETIME")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_LIFETIME);

        Self {
            jwt: JwtConfig {
                secret,
                token_lifetime,
            },
        }
    }
}

/// Random 256-bit secret, hex encoded
fn generate_secret() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}
