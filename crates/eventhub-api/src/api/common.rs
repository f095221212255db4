// Common DTOs and error mapping for the public API
//
// Every failure is rendered as `{"message": "..."}` with a status derived from
// the domain error.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use eventhub_core::{AuthFailure, Error};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard error response for API endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable description of what went wrong.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Plain acknowledgement for operations that return no document.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "event Deleted")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Domain error on its way out through an HTTP response
#[derive(Debug)]
pub struct ApiError(pub Error);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::Validation(_) | Error::InvalidIdentifier { .. } => StatusCode::BAD_REQUEST,
            Error::Auth(AuthFailure::Forbidden) => StatusCode::FORBIDDEN,
            Error::Auth(_) => StatusCode::UNAUTHORIZED,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) | Error::EventUnavailable(_) => StatusCode::CONFLICT,
            Error::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(Error::validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            Error::Store(e) => {
                // Cause stays in the logs
                tracing::error!("Store error: {:#}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Result type for handlers
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Unwrap a sentinel absence into a 404
pub fn found<T>(value: Option<T>, what: &'static str) -> ApiResult<T> {
    value.ok_or(ApiError(Error::NotFound(what)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use uuid::Uuid;

    async fn render(err: Error) -> (StatusCode, serde_json::Value) {
        let response = ApiError::from(err).into_response();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let cases = [
            (Error::validation("name is required"), StatusCode::BAD_REQUEST),
            (Error::invalid_id("event", "x"), StatusCode::BAD_REQUEST),
            (Error::Auth(AuthFailure::MissingToken), StatusCode::UNAUTHORIZED),
            (Error::Auth(AuthFailure::Forbidden), StatusCode::FORBIDDEN),
            (Error::NotFound("Event"), StatusCode::NOT_FOUND),
            (Error::conflict("Email is already registered"), StatusCode::CONFLICT),
            (Error::EventUnavailable(Uuid::nil()), StatusCode::CONFLICT),
        ];
        for (err, expected) in cases {
            let message = err.to_string();
            let (status, body) = render(err).await;
            assert_eq!(status, expected);
            assert_eq!(body["message"], message);
        }
    }

    #[tokio::test]
    async fn test_store_errors_are_not_leaked() {
        let (status, body) = render(anyhow::anyhow!("password=hunter2 host=db").into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
    }

    #[test]
    fn test_found() {
        assert_eq!(found(Some(1), "Event").unwrap(), 1);
        let err = found::<i32>(None, "Event").unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
