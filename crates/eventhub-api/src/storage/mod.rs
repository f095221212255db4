// Storage layer for eventhub
// Decision: Support both PostgreSQL (production) and in-memory (dev mode)
// Decision: Rows stay internal; services convert them to eventhub-core types

pub mod backend;
pub mod memory;
pub mod models;
pub mod password;
pub mod repositories;

pub use backend::StorageBackend;
pub use memory::InMemoryDatabase;
pub use models::*;
pub use repositories::Database;

/// Raised by either backend when a write would break a uniqueness rule.
///
/// Travels inside `anyhow::Error`; services downcast it into a Conflict.
#[derive(Debug, thiserror::Error)]
#[error("{0} already exists")]
pub struct UniqueViolation(pub &'static str);

impl UniqueViolation {
    pub fn email() -> Self {
        Self("email")
    }

    /// Find a uniqueness violation anywhere in an error chain
    pub fn find(err: &anyhow::Error) -> Option<&UniqueViolation> {
        err.chain().find_map(|cause| cause.downcast_ref::<UniqueViolation>())
    }
}
