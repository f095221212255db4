// Services layer for business logic
// Services own validation and id parsing, calling storage directly

pub mod event;
pub mod registration;
pub mod user;

pub use event::EventService;
pub use registration::RegistrationService;
pub use user::UserService;

use crate::storage::UniqueViolation;
use eventhub_core::Error;

/// Map a storage failure into the domain taxonomy.
///
/// Uniqueness violations become Conflict; everything else is a store error.
pub(crate) fn store_error(err: anyhow::Error) -> Error {
    if let Some(violation) = UniqueViolation::find(&err) {
        return match violation.0 {
            "email" => Error::conflict("Email is already registered"),
            other => Error::conflict(format!("{other} already exists")),
        };
    }
    Error::Store(err)
}
