// Account HTTP routes: signup and login
// Decision: Keep the original top-level paths (/signup, /login)

use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use eventhub_core::{NewUser, User};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::middleware::AuthState;
use crate::api::common::{ApiResult, ErrorResponse};
use crate::services::UserService;

/// Signup request
#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    #[schema(example = "Ada")]
    pub name: Option<String>,
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignupResponse {
    pub message: String,
    pub user: User,
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

/// State for account routes
#[derive(Clone, FromRef)]
pub struct AccountsState {
    pub users: Arc<UserService>,
    pub auth: AuthState,
}

/// Create account routes
pub fn routes(state: AccountsState) -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .with_state(state)
}

/// POST /signup - Create an account and start a session
#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = SignupResponse),
        (status = 400, description = "Missing or malformed input", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    ),
    tag = "accounts"
)]
pub async fn signup(
    State(state): State<AccountsState>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SignupResponse>)> {
    let Json(req) = body?;
    let input = NewUser::new(req.name, req.email, req.password)?;

    let user = state.users.signup(input).await?;
    let token = state.auth.jwt_service.issue(user.id, &user.email).map_err(|e| {
        tracing::error!("Failed to issue session token: {:#}", e);
        eventhub_core::Error::Store(e)
    })?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "signup successfully".to_string(),
            user,
            token,
        }),
    ))
}

/// POST /login - Exchange credentials for a session token
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Missing email or password", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse)
    ),
    tag = "accounts"
)]
pub async fn login(
    State(state): State<AccountsState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = body?;
    let email = eventhub_core::validate::required("email", req.email)?;
    let password = eventhub_core::validate::required("password", req.password)?;

    let user = state.users.validate_credentials(&email, &password).await?;
    let token = state.auth.jwt_service.issue(user.id, &user.email).map_err(|e| {
        tracing::error!("Failed to issue session token: {:#}", e);
        eventhub_core::Error::Store(e)
    })?;

    tracing::debug!(user_id = %user.id, "User logged in");
    Ok(Json(LoginResponse {
        message: "user logged In".to_string(),
        token,
    }))
}
