// Router-level tests for the Eventhub API
// Run with: cargo test -p eventhub-api --test api_test
// Uses the in-memory backend; no database or running server needed.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use eventhub_api::auth::{AuthConfig, JwtConfig};
use eventhub_api::storage::StorageBackend;
use eventhub_api::{build_app, CancellationPolicy, ServerConfig};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

struct TestApp {
    router: Router,
}

impl TestApp {
    fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    fn with_config(config: ServerConfig) -> Self {
        let auth = AuthConfig {
            jwt: JwtConfig {
                secret: "api-test-secret".to_string(),
                token_lifetime: Duration::from_secs(7200),
            },
        };
        let router = build_app(Arc::new(StorageBackend::in_memory()), auth, &config);
        Self { router }
    }

    async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn signup(&self, email: &str) -> (Value, String) {
        let (status, body) = self
            .request(
                Method::POST,
                "/signup",
                None,
                Some(json!({"name": "Tester", "email": email, "password": "secret"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
        let token = body["token"].as_str().unwrap().to_string();
        (body["user"].clone(), token)
    }

    async fn create_event(&self, token: &str, name: &str) -> Value {
        let (status, body) = self
            .request(
                Method::POST,
                "/events",
                Some(token),
                Some(json!({
                    "name": name,
                    "description": "Monthly talks",
                    "location": "Hall A",
                    "dateTime": "2030-01-15T18:00:00Z"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create event failed: {body}");
        body["event"].clone()
    }
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_register_and_cancel_workflow() {
    let app = TestApp::new();

    // User A signs up and creates an open event
    let (user_a, token_a) = app.signup("a@x.com").await;
    let event = app.create_event(&token_a, "Meetup").await;
    assert_eq!(event["isAvailable"], true);
    assert_eq!(event["userId"], user_a["id"]);
    let event_id = id_of(&event);

    // User B registers
    let (user_b, token_b) = app.signup("b@x.com").await;
    let (status, body) = app
        .request(
            Method::POST,
            &format!("/events/{event_id}/register"),
            Some(&token_b),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let registration = &body["registration"];
    assert_eq!(registration["eventId"], event_id.as_str());
    assert_eq!(registration["event"]["isAvailable"], false);
    assert_eq!(registration["user"]["id"], user_b["id"]);
    let registration_id = id_of(registration);

    // Registering again is refused
    let (status, body) = app
        .request(
            Method::POST,
            &format!("/events/{event_id}/register"),
            Some(&token_b),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Event is not available for registration");

    // B sees the registration
    let (status, body) = app
        .request(Method::GET, "/events/registered", Some(&token_b), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["registrations"].as_array().unwrap().len(), 1);

    // Cancel by registration id
    let (status, body) = app
        .request(
            Method::DELETE,
            &format!("/events/{registration_id}/cancelRegistration"),
            Some(&token_b),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "registration cancelled");

    // The event is left unavailable after cancellation
    let (status, body) = app
        .request(Method::GET, &format!("/events/{event_id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isAvailable"], false);

    let (_, body) = app
        .request(Method::GET, "/events/registered", Some(&token_b), None)
        .await;
    assert!(body["registrations"].as_array().unwrap().is_empty());

    // Cancelling twice is a 404
    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/registrations/{registration_id}"),
            Some(&token_b),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reopen_policy_restores_availability() {
    let app = TestApp::with_config(ServerConfig {
        cancel_policy: CancellationPolicy::ReopenEvent,
        ..Default::default()
    });
    let (_, token) = app.signup("a@x.com").await;
    let event_id = id_of(&app.create_event(&token, "Meetup").await);

    let (_, body) = app
        .request(
            Method::POST,
            &format!("/events/{event_id}/register"),
            Some(&token),
            None,
        )
        .await;
    let registration_id = id_of(&body["registration"]);

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/registrations/{registration_id}"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app
        .request(Method::GET, "/events/availableEvents", None, None)
        .await;
    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["id"], event_id.as_str());
}

#[tokio::test]
async fn test_available_events_filter_and_creator_embedding() {
    let app = TestApp::new();
    let (user_a, token_a) = app.signup("a@x.com").await;
    let open = app.create_event(&token_a, "Open").await;
    let claimed = app.create_event(&token_a, "Claimed").await;

    app.request(
        Method::POST,
        &format!("/events/{}/register", id_of(&claimed)),
        Some(&token_a),
        None,
    )
    .await;

    let (status, body) = app.request(Method::GET, "/events", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let all = body["events"].as_array().unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|e| e["user"]["id"] == user_a["id"]));
    assert!(all.iter().all(|e| e["user"].get("password").is_none()));
    assert!(all.iter().all(|e| e["user"].get("passwordHash").is_none()));

    let (_, body) = app
        .request(Method::GET, "/events/availableEvents", None, None)
        .await;
    let available = body["events"].as_array().unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0]["id"], open["id"]);
}

#[tokio::test]
async fn test_signup_and_login() {
    let app = TestApp::new();
    let (user, _) = app.signup("a@x.com").await;
    assert_eq!(user["email"], "a@x.com");
    assert!(user.get("password").is_none());

    // Duplicate email
    let (status, body) = app
        .request(
            Method::POST,
            "/signup",
            None,
            Some(json!({"email": "a@x.com", "password": "other"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email is already registered");

    // Missing password
    let (status, _) = app
        .request(
            Method::POST,
            "/signup",
            None,
            Some(json!({"email": "c@x.com"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .request(
            Method::POST,
            "/login",
            None,
            Some(json!({"email": "a@x.com", "password": "secret"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "user logged In");
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = app.request(Method::GET, "/getUser", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "a@x.com");

    // Wrong password and unknown email look the same
    let (wrong_status, wrong) = app
        .request(
            Method::POST,
            "/login",
            None,
            Some(json!({"email": "a@x.com", "password": "nope"})),
        )
        .await;
    let (unknown_status, unknown) = app
        .request(
            Method::POST,
            "/login",
            None,
            Some(json!({"email": "ghost@x.com", "password": "secret"})),
        )
        .await;
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong, unknown);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new();

    let (status, body) = app.request(Method::GET, "/getUser", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token is required");

    let (status, body) = app
        .request(Method::GET, "/getAllUsers", Some("garbage"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired token");

    let (status, _) = app
        .request(
            Method::POST,
            "/events",
            None,
            Some(json!({"name": "x", "description": "y", "location": "z", "dateTime": "2030-01-01T00:00:00Z"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A raw token without the Bearer scheme is accepted
    let (_, token) = app.signup("a@x.com").await;
    let request = Request::builder()
        .uri("/getUser")
        .header(header::AUTHORIZATION, token)
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_deleted_account_token_cannot_register() {
    let app = TestApp::new();
    let (_, owner) = app.signup("owner@x.com").await;
    let (_, token_b) = app.signup("b@x.com").await;
    let event_id = id_of(&app.create_event(&owner, "Meetup").await);

    let (status, _) = app
        .request(Method::DELETE, "/deleteUser", Some(&token_b), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request(
            Method::POST,
            &format!("/events/{event_id}/register"),
            Some(&token_b),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");

    let (_, body) = app
        .request(Method::GET, &format!("/events/{event_id}"), None, None)
        .await;
    assert_eq!(body["isAvailable"], true);
}

#[tokio::test]
async fn test_invalid_and_unknown_ids() {
    let app = TestApp::new();
    let (_, token) = app.signup("a@x.com").await;

    let (status, body) = app
        .request(Method::GET, "/events/not-an-id", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid event ID format");

    let missing = uuid::Uuid::now_v7();
    let (status, body) = app
        .request(Method::GET, &format!("/events/{missing}"), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Event not found");

    let (status, _) = app
        .request(
            Method::POST,
            &format!("/events/{missing}/register"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .request(
            Method::DELETE,
            "/events/bogus/cancelRegistration",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid registration ID format");
}

#[tokio::test]
async fn test_event_update_rules() {
    let app = TestApp::new();
    let (_, owner) = app.signup("owner@x.com").await;
    let (_, other) = app.signup("other@x.com").await;
    let event_id = id_of(&app.create_event(&owner, "Meetup").await);
    let uri = format!("/events/{event_id}");

    // Anonymous and non-owner callers are rejected
    let patch = json!({"location": "Hall B"});
    let (status, _) = app
        .request(Method::PUT, &uri, None, Some(patch.clone()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app
        .request(Method::PUT, &uri, Some(&other), Some(patch.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Availability cannot be patched
    let (status, _) = app
        .request(
            Method::PUT,
            &uri,
            Some(&owner),
            Some(json!({"isAvailable": false})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Empty patch
    let (status, _) = app
        .request(Method::PUT, &uri, Some(&owner), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .request(Method::PUT, &uri, Some(&owner), Some(patch))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["event"]["location"], "Hall B");
    assert_eq!(body["event"]["name"], "Meetup");
    assert_eq!(body["event"]["isAvailable"], true);

    let (status, _) = app.request(Method::DELETE, &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = app.request(Method::DELETE, &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "event Deleted");

    let (status, _) = app.request(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_profile_lifecycle() {
    let app = TestApp::new();
    let (_, token_a) = app.signup("a@x.com").await;
    app.signup("b@x.com").await;

    let (status, body) = app
        .request(Method::GET, "/getAllUsers", Some(&token_a), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"].as_array().unwrap().len(), 2);

    let (status, _) = app
        .request(
            Method::PUT,
            "/updateUser",
            Some(&token_a),
            Some(json!({"email": "b@x.com"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .request(
            Method::PUT,
            "/updateUser",
            Some(&token_a),
            Some(json!({"id": "takeover"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .request(
            Method::PUT,
            "/updateUser",
            Some(&token_a),
            Some(json!({"name": "Ada", "password": "new-secret"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ada");

    let (status, _) = app
        .request(
            Method::POST,
            "/login",
            None,
            Some(json!({"email": "a@x.com", "password": "new-secret"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request(Method::DELETE, "/deleteUser", Some(&token_a), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    // The token outlives the account
    let (status, _) = app.request(Method::GET, "/getUser", Some(&token_a), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_concurrent_register_has_one_winner() {
    let app = Arc::new(TestApp::new());
    let (_, owner) = app.signup("owner@x.com").await;
    let event_id = id_of(&app.create_event(&owner, "Popular").await);

    let mut tokens = Vec::new();
    for i in 0..10 {
        let (_, token) = app.signup(&format!("u{i}@x.com")).await;
        tokens.push(token);
    }

    let mut handles = Vec::new();
    for token in tokens {
        let app = app.clone();
        let uri = format!("/events/{event_id}/register");
        handles.push(tokio::spawn(async move {
            app.request(Method::POST, &uri, Some(&token), None).await.0
        }));
    }

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.unwrap());
    }
    assert_eq!(
        statuses.iter().filter(|s| **s == StatusCode::CREATED).count(),
        1
    );
    assert_eq!(
        statuses.iter().filter(|s| **s == StatusCode::CONFLICT).count(),
        9
    );
}

#[tokio::test]
async fn test_api_prefix_applies_to_routes() {
    let app = TestApp::with_config(ServerConfig {
        api_prefix: "/api".to_string(),
        ..Default::default()
    });

    let (status, _) = app.request(Method::GET, "/api/events", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.request(Method::GET, "/events", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Health is never prefixed
    let (status, _) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}
