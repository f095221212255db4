// Event HTTP routes
//
// Reads are public. Creating requires a session; updating and deleting are
// limited to the event's creator.

use axum::{
    extract::{rejection::JsonRejection, FromRef, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use eventhub_core::{Event, EventPatch, NewEvent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::common::{found, ApiResult, ErrorResponse, MessageResponse};
use crate::auth::{AuthState, AuthUser};
use crate::services::EventService;

/// Request to create an event. Availability and owner are set by the server.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[schema(example = "Rust meetup")]
    pub name: Option<String>,
    #[schema(example = "Monthly talks and pizza")]
    pub description: Option<String>,
    #[schema(example = "Hall A")]
    pub location: Option<String>,
    #[schema(example = "2030-01-15T18:00:00Z")]
    pub date_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EventResponse {
    pub message: String,
    pub event: Event,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EventsResponse {
    pub message: String,
    pub events: Vec<Event>,
}

/// State for event routes
#[derive(Clone, FromRef)]
pub struct EventsState {
    pub events: Arc<EventService>,
    pub auth: AuthState,
}

/// Create event routes
pub fn routes(state: EventsState) -> Router {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/availableEvents", get(list_available_events))
        .route(
            "/events/:id",
            get(get_event).put(update_event).delete(delete_event),
        )
        .with_state(state)
}

/// POST /events - Create an event owned by the caller
#[utoipa::path(
    post,
    path = "/events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventResponse),
        (status = 400, description = "Missing required fields", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("session_token" = [])),
    tag = "events"
)]
pub async fn create_event(
    State(state): State<EventsState>,
    auth: AuthUser,
    body: Result<Json<CreateEventRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<EventResponse>)> {
    let Json(req) = body?;
    let input = NewEvent::new(req.name, req.description, req.location, req.date_time)?;
    let event = state.events.create(&auth.user_id, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(EventResponse {
            message: "event created successfully".to_string(),
            event,
        }),
    ))
}

/// GET /events - All events with their creators
#[utoipa::path(
    get,
    path = "/events",
    responses(
        (status = 200, description = "Events fetched", body = EventsResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn list_events(State(state): State<EventsState>) -> ApiResult<Json<EventsResponse>> {
    let events = state.events.list_all().await?;
    Ok(Json(EventsResponse {
        message: "Events fetched".to_string(),
        events,
    }))
}

/// GET /events/availableEvents - Events still open for registration
#[utoipa::path(
    get,
    path = "/events/availableEvents",
    responses(
        (status = 200, description = "Available events fetched", body = EventsResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn list_available_events(
    State(state): State<EventsState>,
) -> ApiResult<Json<EventsResponse>> {
    let events = state.events.list_available().await?;
    Ok(Json(EventsResponse {
        message: "Available Events fetched".to_string(),
        events,
    }))
}

/// GET /events/{id} - One event
#[utoipa::path(
    get,
    path = "/events/{id}",
    params(("id" = String, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event found", body = Event),
        (status = 400, description = "Malformed event ID", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn get_event(
    State(state): State<EventsState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Event>> {
    let event = found(state.events.get_by_id(&id).await?, "Event")?;
    Ok(Json(event))
}

/// PUT /events/{id} - Partial update by the creator
#[utoipa::path(
    put,
    path = "/events/{id}",
    params(("id" = String, Path, description = "Event ID")),
    request_body = EventPatch,
    responses(
        (status = 200, description = "Event updated", body = EventResponse),
        (status = 400, description = "Invalid patch or event ID", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller did not create the event", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    security(("session_token" = [])),
    tag = "events"
)]
pub async fn update_event(
    State(state): State<EventsState>,
    auth: AuthUser,
    Path(id): Path<String>,
    body: Result<Json<EventPatch>, JsonRejection>,
) -> ApiResult<Json<EventResponse>> {
    let Json(patch) = body?;
    state.events.check_owner(&id, &auth.user_id).await?;

    let event = found(state.events.update(&id, patch).await?, "Event")?;
    Ok(Json(EventResponse {
        message: "event updated".to_string(),
        event,
    }))
}

/// DELETE /events/{id} - Delete by the creator
#[utoipa::path(
    delete,
    path = "/events/{id}",
    params(("id" = String, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event deleted", body = MessageResponse),
        (status = 400, description = "Malformed event ID", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller did not create the event", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    security(("session_token" = [])),
    tag = "events"
)]
pub async fn delete_event(
    State(state): State<EventsState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.events.check_owner(&id, &auth.user_id).await?;

    found(state.events.delete(&id).await?, "Event")?;
    Ok(Json(MessageResponse::new("event Deleted")))
}
