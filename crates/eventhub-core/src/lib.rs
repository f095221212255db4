// Eventhub Core
//
// Domain types shared by the storage, service and HTTP layers. Nothing here
// touches a database or the network.

pub mod error;
pub mod event;
pub mod id;
pub mod registration;
pub mod user;
pub mod validate;

pub use error::{AuthFailure, Error, Result};
pub use event::{Event, EventPatch, EventState, NewEvent};
pub use id::parse_id;
pub use registration::Registration;
pub use user::{NewUser, User, UserPatch};
