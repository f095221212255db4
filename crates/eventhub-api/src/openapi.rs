// OpenAPI specification generation
//
// Served by the API server under /swagger-ui and printed by the
// export-openapi binary.

use crate::api::{self, ErrorResponse, MessageResponse};
use crate::auth;
use eventhub_core::{Event, EventPatch, Registration, User, UserPatch};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// OpenAPI documentation for the Eventhub API
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::routes::signup,
        auth::routes::login,
        api::users::get_user,
        api::users::list_users,
        api::users::update_user,
        api::users::delete_user,
        api::events::create_event,
        api::events::list_events,
        api::events::list_available_events,
        api::events::get_event,
        api::events::update_event,
        api::events::delete_event,
        api::registrations::register_event,
        api::registrations::list_registrations,
        api::registrations::cancel_registration,
        api::registrations::cancel_event_registration,
    ),
    components(
        schemas(
            User, UserPatch, Event, EventPatch, Registration,
            ErrorResponse, MessageResponse,
            auth::routes::SignupRequest, auth::routes::SignupResponse,
            auth::routes::LoginRequest, auth::routes::LoginResponse,
            api::users::UserResponse, api::users::UsersResponse,
            api::events::CreateEventRequest, api::events::EventResponse,
            api::events::EventsResponse,
            api::registrations::RegistrationResponse,
            api::registrations::RegistrationsResponse,
        )
    ),
    tags(
        (name = "accounts", description = "Signup and login"),
        (name = "users", description = "Caller profile management"),
        (name = "events", description = "Event management endpoints"),
        (name = "registrations", description = "Event registration workflow")
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Eventhub API",
        version = env!("CARGO_PKG_VERSION"),
        description = "API for creating events and registering for them",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        // Raw token or "Bearer <token>"
        components.add_security_scheme(
            "session_token",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("Authorization"))),
        );
    }
}

impl ApiDoc {
    /// Generate the OpenAPI spec as a pretty-printed JSON string
    pub fn to_json() -> Result<String, serde_json::Error> {
        Self::openapi().to_pretty_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let json: serde_json::Value = serde_json::from_str(&ApiDoc::to_json().unwrap()).unwrap();
        let paths = json["paths"].as_object().unwrap();
        for path in [
            "/signup",
            "/login",
            "/getUser",
            "/getAllUsers",
            "/updateUser",
            "/deleteUser",
            "/events",
            "/events/availableEvents",
            "/events/{id}",
            "/events/{id}/register",
            "/events/registered",
            "/events/{id}/cancelRegistration",
            "/registrations/{id}",
        ] {
            assert!(paths.contains_key(path), "missing path {path}");
        }
        assert!(json["components"]["securitySchemes"]["session_token"].is_object());
    }
}
