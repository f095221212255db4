// Registration domain type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::event::Event;
use crate::user::User;

/// Claim held by a user on an event's single slot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Referenced event, resolved at read time
    #[serde(default)]
    pub event: Option<Event>,
    /// Registrant, resolved at read time
    #[serde(default)]
    pub user: Option<User>,
}

impl Registration {
    pub fn with_event(mut self, event: Option<Event>) -> Self {
        self.event = event;
        self
    }

    pub fn with_user(mut self, user: Option<User>) -> Self {
        self.user = user;
        self
    }
}
