// HTTP API routes
//
// Each submodule handles one resource with its own state struct.

pub mod common;
pub mod events;
pub mod registrations;
pub mod users;

// Re-export common types
pub use common::{ApiError, ApiResult, ErrorResponse, MessageResponse};
