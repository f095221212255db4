// Application assembly
// Decision: Health stays outside API_PREFIX; everything else is nested under it
// Decision: Services are built once and shared through Arc

use axum::http::{header, HeaderValue, Method};
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api;
use crate::auth::{self, AuthConfig, AuthState};
use crate::config::{CancellationPolicy, ServerConfig};
use crate::openapi::ApiDoc;
use crate::services::{EventService, RegistrationService, UserService};
use crate::storage::StorageBackend;

/// Services wired to one storage backend
#[derive(Clone)]
pub struct Services {
    pub users: Arc<UserService>,
    pub events: Arc<EventService>,
    pub registrations: Arc<RegistrationService>,
}

impl Services {
    pub fn new(db: Arc<StorageBackend>, cancel_policy: CancellationPolicy) -> Self {
        let users = Arc::new(UserService::new(db.clone()));
        let events = Arc::new(EventService::new(db.clone(), users.clone()));
        let registrations = Arc::new(RegistrationService::new(
            db,
            users.clone(),
            events.clone(),
            cancel_policy,
        ));
        Self {
            users,
            events,
            registrations,
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    storage: &'static str,
}

/// State for health endpoint
#[derive(Clone)]
struct HealthState {
    storage: &'static str,
}

async fn health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage,
    })
}

/// Build the full HTTP application
pub fn build_app(
    db: Arc<StorageBackend>,
    auth_config: AuthConfig,
    config: &ServerConfig,
) -> Router {
    let health_state = HealthState {
        storage: if db.is_dev_mode() {
            "memory"
        } else {
            "postgres"
        },
    };
    let services = Services::new(db, config.cancel_policy);
    let auth_state = AuthState::new(auth_config);

    let api_routes = Router::new()
        .merge(auth::routes(auth::routes::AccountsState {
            users: services.users.clone(),
            auth: auth_state.clone(),
        }))
        .merge(api::users::routes(api::users::UsersState {
            users: services.users.clone(),
            auth: auth_state.clone(),
        }))
        .merge(api::events::routes(api::events::EventsState {
            events: services.events.clone(),
            auth: auth_state.clone(),
        }))
        .merge(api::registrations::routes(
            api::registrations::RegistrationsState {
                registrations: services.registrations.clone(),
                auth: auth_state,
            },
        ));

    let app = Router::new()
        .route("/health", get(health).with_state(health_state))
        .merge(build_router_with_prefix(api_routes, &config.api_prefix))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

    // Only needed when clients are served from a different origin
    let cors_origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    let app = if cors_origins.is_empty() {
        app
    } else {
        app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(cors_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]),
        )
    };

    app.layer(TraceLayer::new_for_http())
}

/// Build router with optional API prefix (extracted for testing)
pub fn build_router_with_prefix<S: Clone + Send + Sync + 'static>(
    api_routes: Router<S>,
    api_prefix: &str,
) -> Router<S> {
    if api_prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(api_prefix, api_routes)
    }
}
