// Authentication: session tokens, the AuthUser extractor, signup and login

pub mod config;
pub mod jwt;
pub mod middleware;
pub mod routes;

pub use config::{AuthConfig, JwtConfig};
pub use jwt::{JwtService, SessionClaims};
pub use middleware::{AuthState, AuthUser};
pub use routes::routes;
