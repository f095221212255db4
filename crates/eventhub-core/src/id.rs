// Identifier parsing
//
// Path segments and token claims carry ids as strings. Parsing happens in the
// services so that a malformed id becomes InvalidIdentifier rather than a
// framework-level rejection.

use uuid::Uuid;

use crate::error::{Error, Result};

pub const USER: &str = "user";
pub const EVENT: &str = "event";
pub const REGISTRATION: &str = "registration";

/// Parse an id of the given kind, failing with InvalidIdentifier
pub fn parse_id(kind: &'static str, raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| Error::invalid_id(kind, raw))
}
