// Event domain types
//
// An event has a single registration slot. `is_available` is true exactly
// when no registration references the event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::{Error, Result};
use crate::user::User;
use crate::validate::{non_blank, required};

/// Registration state of an event, derived from its availability flag.
///
/// Not part of the wire format; clients see `isAvailable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventState {
    /// No registration; open for claiming
    Open,
    /// Exactly one registration holds the slot
    Claimed,
}

impl EventState {
    pub fn from_availability(is_available: bool) -> Self {
        if is_available {
            EventState::Open
        } else {
            EventState::Claimed
        }
    }

    pub fn is_available(self) -> bool {
        matches!(self, EventState::Open)
    }
}

impl std::fmt::Display for EventState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventState::Open => write!(f, "open"),
            EventState::Claimed => write!(f, "claimed"),
        }
    }
}

/// Event as returned by the API, optionally decorated with its creator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub location: String,
    pub date_time: DateTime<Utc>,
    pub is_available: bool,
    /// Creator of the event (not the registrant)
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Creator record, resolved at read time. Null when not resolved or the
    /// creator no longer exists.
    #[serde(default)]
    pub user: Option<User>,
}

impl Event {
    pub fn with_user(mut self, user: Option<User>) -> Self {
        self.user = user;
        self
    }
}

/// Validated input for creating an event
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub description: String,
    pub location: String,
    pub date_time: DateTime<Utc>,
}

impl NewEvent {
    pub fn new(
        name: Option<String>,
        description: Option<String>,
        location: Option<String>,
        date_time: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        let name = required("name", name)?;
        let description = required("description", description)?;
        let location = required("location", location)?;
        let date_time = date_time.ok_or_else(|| Error::validation("dateTime is required"))?;

        Ok(Self {
            name,
            description,
            location,
            date_time,
        })
    }
}

/// Partial update of an event's descriptive fields.
///
/// Availability and ownership are not part of the patch; they change only
/// through the registration workflow.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct EventPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub date_time: Option<DateTime<Utc>>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.date_time.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::validation("No fields to update"));
        }
        for (field, value) in [
            ("name", &self.name),
            ("description", &self.description),
            ("location", &self.location),
        ] {
            if let Some(value) = value {
                non_blank(field, value)?;
            }
        }
        Ok(())
    }
}
