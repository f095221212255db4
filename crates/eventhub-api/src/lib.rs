// Eventhub API Library
// Decision: Shared library for binaries (API server, OpenAPI export) and tests

// Application assembly
pub mod app;

// HTTP routes and error mapping
pub mod api;

// Authentication module
pub mod auth;

// Server configuration
pub mod config;

// OpenAPI spec generation
pub mod openapi;

// Services layer
pub mod services;

// Storage layer
pub mod storage;

pub use app::{build_app, Services};
pub use config::{CancellationPolicy, ServerConfig};
