// Error types for eventhub operations
//
// Store-level absence is modelled as Option (the "not found" sentinel).
// NotFound here is only raised where an operation cannot proceed without the
// document, e.g. registering for an event that does not exist.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for eventhub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Reason an authentication or authorization check failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// Unknown email or wrong password. Deliberately indistinguishable.
    InvalidCredentials,
    /// No session token on a protected route
    MissingToken,
    /// Malformed, badly signed or expired session token
    InvalidToken,
    /// Authenticated, but not allowed to touch the resource
    Forbidden,
}

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthFailure::InvalidCredentials => write!(f, "Invalid email or password"),
            AuthFailure::MissingToken => write!(f, "Token is required"),
            AuthFailure::InvalidToken => write!(f, "Invalid or expired token"),
            AuthFailure::Forbidden => write!(f, "Not allowed to modify this resource"),
        }
    }
}

/// Errors surfaced by services and mapped to HTTP responses at the boundary
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed required input
    #[error("{0}")]
    Validation(String),

    /// Identifier string that does not parse
    #[error("Invalid {kind} ID format")]
    InvalidIdentifier { kind: &'static str, value: String },

    /// Document required by the operation does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Uniqueness violation (duplicate email)
    #[error("{0}")]
    Conflict(String),

    /// Event is already claimed by a registration
    #[error("Event is not available for registration")]
    EventUnavailable(Uuid),

    /// Authentication or authorization failure
    #[error("{0}")]
    Auth(AuthFailure),

    /// Underlying persistence failure, not further distinguished
    #[error("Storage error: {0}")]
    Store(#[from] anyhow::Error),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Create an invalid identifier error
    pub fn invalid_id(kind: &'static str, value: impl Into<String>) -> Self {
        Error::InvalidIdentifier {
            kind,
            value: value.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Error::Conflict(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failures_share_credentials_message() {
        let err = Error::Auth(AuthFailure::InvalidCredentials);
        assert_eq!(err.to_string(), "Invalid email or password");
    }

    #[test]
    fn test_invalid_identifier_message() {
        let err = Error::invalid_id("event", "not-an-id");
        assert_eq!(err.to_string(), "Invalid event ID format");
        match err {
            Error::InvalidIdentifier { kind, value } => {
                assert_eq!(kind, "event");
                assert_eq!(value, "not-an-id");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_store_error_from_anyhow() {
        let err: Error = anyhow::anyhow!("connection reset").into();
        assert!(matches!(err, Error::Store(_)));
        assert!(err.to_string().contains("connection reset"));
    }
}
