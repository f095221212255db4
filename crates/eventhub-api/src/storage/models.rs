// Database models (internal, may differ from public DTOs)

use chrono::{DateTime, Utc};
use eventhub_core::{Event, EventState, Registration, User};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================
// Users
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateUserRow {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUserRow {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

// ============================================
// Events
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub location: String,
    pub date_time: DateTime<Utc>,
    pub is_available: bool,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventRow {
    pub fn state(&self) -> EventState {
        EventState::from_availability(self.is_available)
    }

    pub fn set_state(&mut self, state: EventState) {
        self.is_available = state.is_available();
    }
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            name: row.name,
            description: row.description,
            location: row.location,
            date_time: row.date_time,
            is_available: row.is_available,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            user: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateEventRow {
    pub name: String,
    pub description: String,
    pub location: String,
    pub date_time: DateTime<Utc>,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateEventRow {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub date_time: Option<DateTime<Utc>>,
}

// ============================================
// Registrations
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct RegistrationRow {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<RegistrationRow> for Registration {
    fn from(row: RegistrationRow) -> Self {
        Registration {
            id: row.id,
            event_id: row.event_id,
            user_id: row.user_id,
            created_at: row.created_at,
            event: None,
            user: None,
        }
    }
}

/// Result of an atomic claim on an event's registration slot
#[derive(Debug, Clone)]
pub enum ClaimOutcome {
    /// Slot taken; the event row reflects the flip to unavailable
    Claimed {
        registration: RegistrationRow,
        event: EventRow,
    },
    NotFound,
    /// Another registration already holds the slot
    Unavailable,
}
