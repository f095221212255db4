// User profile HTTP routes (all authenticated)

use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    routing::{delete, get, put},
    Json, Router,
};
use eventhub_core::{User, UserPatch};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::common::{found, ApiResult, ErrorResponse, MessageResponse};
use crate::auth::{AuthState, AuthUser};
use crate::services::UserService;

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub message: String,
    pub user: User,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UsersResponse {
    pub message: String,
    pub users: Vec<User>,
}

/// State for user routes
#[derive(Clone, FromRef)]
pub struct UsersState {
    pub users: Arc<UserService>,
    pub auth: AuthState,
}

/// Create user routes
pub fn routes(state: UsersState) -> Router {
    Router::new()
        .route("/getUser", get(get_user))
        .route("/getAllUsers", get(list_users))
        .route("/updateUser", put(update_user))
        .route("/deleteUser", delete(delete_user))
        .with_state(state)
}

/// GET /getUser - Caller's own profile
#[utoipa::path(
    get,
    path = "/getUser",
    responses(
        (status = 200, description = "User fetched", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Account no longer exists", body = ErrorResponse)
    ),
    security(("session_token" = [])),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<UsersState>,
    auth: AuthUser,
) -> ApiResult<Json<UserResponse>> {
    let user = found(state.users.by_id(&auth.user_id).await?, "User")?;
    Ok(Json(UserResponse {
        message: "User fetched".to_string(),
        user,
    }))
}

/// GET /getAllUsers - Every registered user
#[utoipa::path(
    get,
    path = "/getAllUsers",
    responses(
        (status = 200, description = "Users fetched", body = UsersResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("session_token" = [])),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<UsersState>,
    _auth: AuthUser,
) -> ApiResult<Json<UsersResponse>> {
    let users = state.users.list_all().await?;
    Ok(Json(UsersResponse {
        message: "Users fetched".to_string(),
        users,
    }))
}

/// PUT /updateUser - Partial update of the caller's profile
#[utoipa::path(
    put,
    path = "/updateUser",
    request_body = UserPatch,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Invalid or empty patch", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    ),
    security(("session_token" = [])),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<UsersState>,
    auth: AuthUser,
    body: Result<Json<UserPatch>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let Json(patch) = body?;
    let user = found(state.users.update(&auth.user_id, patch).await?, "User")?;
    Ok(Json(user))
}

/// DELETE /deleteUser - Remove the caller's account
#[utoipa::path(
    delete,
    path = "/deleteUser",
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("session_token" = [])),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<UsersState>,
    auth: AuthUser,
) -> ApiResult<Json<MessageResponse>> {
    found(state.users.delete(&auth.user_id).await?, "User")?;
    Ok(Json(MessageResponse::new("user Deleted")))
}
