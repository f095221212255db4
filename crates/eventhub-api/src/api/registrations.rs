// Registration HTTP routes (all authenticated)
//
// The `:id` in /events/:id/cancelRegistration is a registration id, not an
// event id. /registrations/:id names the same operation unambiguously.

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use eventhub_core::Registration;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::common::{found, ApiResult, ErrorResponse};
use crate::auth::{AuthState, AuthUser};
use crate::services::RegistrationService;

#[derive(Debug, Serialize, ToSchema)]
pub struct RegistrationResponse {
    pub message: String,
    pub registration: Registration,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegistrationsResponse {
    pub registrations: Vec<Registration>,
}

/// State for registration routes
#[derive(Clone, FromRef)]
pub struct RegistrationsState {
    pub registrations: Arc<RegistrationService>,
    pub auth: AuthState,
}

/// Create registration routes
pub fn routes(state: RegistrationsState) -> Router {
    Router::new()
        .route("/events/registered", get(list_registrations))
        .route("/events/:id/register", post(register_event))
        .route(
            "/events/:id/cancelRegistration",
            delete(cancel_event_registration),
        )
        .route("/registrations/:id", delete(cancel_registration))
        .with_state(state)
}

/// POST /events/{id}/register - Claim the event for the caller
#[utoipa::path(
    post,
    path = "/events/{id}/register",
    params(("id" = String, Path, description = "Event ID")),
    responses(
        (status = 201, description = "Event registered", body = RegistrationResponse),
        (status = 400, description = "Malformed event ID", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 409, description = "Event already claimed", body = ErrorResponse)
    ),
    security(("session_token" = [])),
    tag = "registrations"
)]
pub async fn register_event(
    State(state): State<RegistrationsState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<(StatusCode, Json<RegistrationResponse>)> {
    let registration = state.registrations.register(&id, &auth.user_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse {
            message: "event Registered successfully".to_string(),
            registration,
        }),
    ))
}

/// GET /events/registered - Caller's registrations
#[utoipa::path(
    get,
    path = "/events/registered",
    responses(
        (status = 200, description = "Caller's registrations", body = RegistrationsResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("session_token" = [])),
    tag = "registrations"
)]
pub async fn list_registrations(
    State(state): State<RegistrationsState>,
    auth: AuthUser,
) -> ApiResult<Json<RegistrationsResponse>> {
    let registrations = state.registrations.list_by_user(&auth.user_id).await?;
    Ok(Json(RegistrationsResponse { registrations }))
}

/// DELETE /registrations/{id} - Cancel a registration by its id
#[utoipa::path(
    delete,
    path = "/registrations/{id}",
    params(("id" = String, Path, description = "Registration ID")),
    responses(
        (status = 200, description = "Registration cancelled", body = RegistrationResponse),
        (status = 400, description = "Malformed registration ID", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Registration not found", body = ErrorResponse)
    ),
    security(("session_token" = [])),
    tag = "registrations"
)]
pub async fn cancel_registration(
    State(state): State<RegistrationsState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<RegistrationResponse>> {
    let registration = found(state.registrations.cancel(&id).await?, "Registration")?;
    Ok(Json(RegistrationResponse {
        message: "registration cancelled".to_string(),
        registration,
    }))
}

/// DELETE /events/{id}/cancelRegistration - Cancel a registration by its id
///
/// `id` is the registration id despite the path. Same operation as
/// DELETE /registrations/{id}.
#[utoipa::path(
    delete,
    path = "/events/{id}/cancelRegistration",
    params(("id" = String, Path, description = "Registration ID")),
    responses(
        (status = 200, description = "Registration cancelled", body = RegistrationResponse),
        (status = 400, description = "Malformed registration ID", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Registration not found", body = ErrorResponse)
    ),
    security(("session_token" = [])),
    tag = "registrations"
)]
pub async fn cancel_event_registration(
    state: State<RegistrationsState>,
    auth: AuthUser,
    id: Path<String>,
) -> ApiResult<Json<RegistrationResponse>> {
    cancel_registration(state, auth, id).await
}
