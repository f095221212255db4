// In-memory storage implementation for dev mode
// Decision: Use parking_lot for thread-safe access
// Decision: UUIDs generated via uuid v7 (time-ordered)
//
// Mirrors the PostgreSQL repository, including the email uniqueness rule and
// the single-slot rule on registrations, so the server runs without a database.

use anyhow::Result;
use chrono::{DateTime, Utc};
use eventhub_core::EventState;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use super::models::*;
use super::UniqueViolation;

/// In-memory database for dev mode
/// All data is stored in memory and lost on restart
#[derive(Default)]
pub struct InMemoryDatabase {
    users: RwLock<HashMap<Uuid, UserRow>>,
    events: RwLock<HashMap<Uuid, EventRow>>,
    registrations: RwLock<HashMap<Uuid, RegistrationRow>>,
    /// Fail every user read, so tests can reach store-error paths
    #[cfg(test)]
    fail_user_reads: std::sync::atomic::AtomicBool,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[cfg(test)]
    pub(crate) fn set_fail_user_reads(&self, fail: bool) {
        self.fail_user_reads
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    #[cfg(test)]
    fn check_user_reads(&self) -> Result<()> {
        if self
            .fail_user_reads
            .load(std::sync::atomic::Ordering::SeqCst)
        {
            anyhow::bail!("user store unavailable");
        }
        Ok(())
    }

    #[cfg(not(test))]
    fn check_user_reads(&self) -> Result<()> {
        Ok(())
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        let mut users = self.users.write();
        if users.values().any(|u| u.email == input.email) {
            return Err(UniqueViolation::email().into());
        }

        let now = Self::now();
        let row = UserRow {
            id: Uuid::now_v7(),
            name: input.name,
            email: input.email,
            password_hash: input.password_hash,
            created_at: now,
            updated_at: now,
        };
        users.insert(row.id, row.clone());
        Ok(row)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        self.check_user_reads()?;
        Ok(self.users.read().get(&id).cloned())
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    pub async fn list_users(&self) -> Result<Vec<UserRow>> {
        let mut result: Vec<_> = self.users.read().values().cloned().collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(result)
    }

    pub async fn update_user(&self, id: Uuid, input: UpdateUserRow) -> Result<Option<UserRow>> {
        let mut users = self.users.write();
        if let Some(email) = &input.email {
            if users.values().any(|u| u.id != id && &u.email == email) {
                return Err(UniqueViolation::email().into());
            }
        }

        if let Some(user) = users.get_mut(&id) {
            if let Some(name) = input.name {
                user.name = name;
            }
            if let Some(email) = input.email {
                user.email = email;
            }
            if let Some(password_hash) = input.password_hash {
                user.password_hash = password_hash;
            }
            user.updated_at = Self::now();
            return Ok(Some(user.clone()));
        }
        Ok(None)
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        Ok(self.users.write().remove(&id))
    }

    // ============================================
    // Events
    // ============================================

    pub async fn create_event(&self, input: CreateEventRow) -> Result<EventRow> {
        let now = Self::now();
        let row = EventRow {
            id: Uuid::now_v7(),
            name: input.name,
            description: input.description,
            location: input.location,
            date_time: input.date_time,
            is_available: true,
            user_id: input.user_id,
            created_at: now,
            updated_at: now,
        };
        self.events.write().insert(row.id, row.clone());
        Ok(row)
    }

    pub async fn get_event(&self, id: Uuid) -> Result<Option<EventRow>> {
        Ok(self.events.read().get(&id).cloned())
    }

    pub async fn list_events(&self, available_only: bool) -> Result<Vec<EventRow>> {
        let mut result: Vec<_> = self
            .events
            .read()
            .values()
            .filter(|e| !available_only || e.is_available)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(result)
    }

    pub async fn update_event(&self, id: Uuid, input: UpdateEventRow) -> Result<Option<EventRow>> {
        let mut events = self.events.write();
        if let Some(event) = events.get_mut(&id) {
            if let Some(name) = input.name {
                event.name = name;
            }
            if let Some(description) = input.description {
                event.description = description;
            }
            if let Some(location) = input.location {
                event.location = location;
            }
            if let Some(date_time) = input.date_time {
                event.date_time = date_time;
            }
            event.updated_at = Self::now();
            return Ok(Some(event.clone()));
        }
        Ok(None)
    }

    pub async fn delete_event(&self, id: Uuid) -> Result<Option<EventRow>> {
        Ok(self.events.write().remove(&id))
    }

    // ============================================
    // Registrations
    // ============================================

    /// Check, flip and insert while holding both write locks.
    ///
    /// Lock order is events then registrations, the same as cancellation.
    pub async fn claim_event(&self, event_id: Uuid, user_id: Uuid) -> Result<ClaimOutcome> {
        let mut events = self.events.write();
        let mut registrations = self.registrations.write();

        let Some(event) = events.get_mut(&event_id) else {
            return Ok(ClaimOutcome::NotFound);
        };
        if event.state() == EventState::Claimed
            || registrations.values().any(|r| r.event_id == event_id)
        {
            return Ok(ClaimOutcome::Unavailable);
        }

        let now = Self::now();
        event.set_state(EventState::Claimed);
        event.updated_at = now;

        let registration = RegistrationRow {
            id: Uuid::now_v7(),
            event_id,
            user_id,
            created_at: now,
        };
        registrations.insert(registration.id, registration.clone());

        Ok(ClaimOutcome::Claimed {
            registration,
            event: event.clone(),
        })
    }

    pub async fn cancel_registration(
        &self,
        id: Uuid,
        reopen_event: bool,
    ) -> Result<Option<RegistrationRow>> {
        let mut events = self.events.write();
        let mut registrations = self.registrations.write();

        let removed = registrations.remove(&id);
        if let (Some(registration), true) = (&removed, reopen_event) {
            if let Some(event) = events.get_mut(&registration.event_id) {
                event.set_state(EventState::Open);
                event.updated_at = Self::now();
            }
        }
        Ok(removed)
    }

    pub async fn list_registrations_for_user(&self, user_id: Uuid) -> Result<Vec<RegistrationRow>> {
        let mut result: Vec<_> = self
            .registrations
            .read()
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(result)
    }
}
