// Event service: CRUD over events with creator decoration
//
// The creator's User record is joined at read time and never written back.

use crate::storage::{
    models::{CreateEventRow, EventRow, UpdateEventRow},
    StorageBackend,
};
use eventhub_core::{id, parse_id, AuthFailure, Error, Event, EventPatch, NewEvent, Result};
use std::sync::Arc;

use super::{store_error, UserService};

pub struct EventService {
    db: Arc<StorageBackend>,
    users: Arc<UserService>,
}

impl EventService {
    pub fn new(db: Arc<StorageBackend>, users: Arc<UserService>) -> Self {
        Self { db, users }
    }

    /// Create an event owned by `user_id`. New events start open.
    pub async fn create(&self, user_id: &str, input: NewEvent) -> Result<Event> {
        let user_id = parse_id(id::USER, user_id)?;
        let row = self
            .db
            .create_event(CreateEventRow {
                name: input.name,
                description: input.description,
                location: input.location,
                date_time: input.date_time,
                user_id,
            })
            .await
            .map_err(store_error)?;

        tracing::info!(event_id = %row.id, user_id = %user_id, "Event created");
        self.decorate(row).await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Event>> {
        let id = parse_id(id::EVENT, id)?;
        let row = self.db.get_event(id).await.map_err(store_error)?;
        match row {
            Some(row) => Ok(Some(self.decorate(row).await?)),
            None => Ok(None),
        }
    }

    pub async fn list_all(&self) -> Result<Vec<Event>> {
        let rows = self.db.list_events(false).await.map_err(store_error)?;
        self.decorate_all(rows).await
    }

    /// Events still open for registration
    pub async fn list_available(&self) -> Result<Vec<Event>> {
        let rows = self.db.list_events(true).await.map_err(store_error)?;
        self.decorate_all(rows).await
    }

    /// Merge the supplied fields; absent fields keep their values
    pub async fn update(&self, id: &str, patch: EventPatch) -> Result<Option<Event>> {
        let id = parse_id(id::EVENT, id)?;
        patch.validate()?;

        let row = self
            .db
            .update_event(
                id,
                UpdateEventRow {
                    name: patch.name,
                    description: patch.description,
                    location: patch.location,
                    date_time: patch.date_time,
                },
            )
            .await
            .map_err(store_error)?;

        match row {
            Some(row) => Ok(Some(self.decorate(row).await?)),
            None => Ok(None),
        }
    }

    /// Remove an event. Registrations referencing it are left in place.
    pub async fn delete(&self, id: &str) -> Result<Option<Event>> {
        let id = parse_id(id::EVENT, id)?;
        let row = self.db.delete_event(id).await.map_err(store_error)?;

        match row {
            Some(row) => {
                tracing::info!(event_id = %row.id, "Event deleted");
                Ok(Some(self.decorate(row).await?))
            }
            None => Ok(None),
        }
    }

    /// Fail unless `caller_id` created the event
    pub async fn check_owner(&self, id: &str, caller_id: &str) -> Result<()> {
        let event_id = parse_id(id::EVENT, id)?;
        let caller_id = parse_id(id::USER, caller_id)?;

        let row = self
            .db
            .get_event(event_id)
            .await
            .map_err(store_error)?
            .ok_or(Error::NotFound("Event"))?;

        if row.user_id != caller_id {
            tracing::debug!(event_id = %event_id, caller_id = %caller_id, "Rejected non-owner event mutation");
            return Err(Error::Auth(AuthFailure::Forbidden));
        }
        Ok(())
    }

    pub(crate) async fn decorate(&self, row: EventRow) -> Result<Event> {
        let creator = self.users.by_uuid(row.user_id).await?;
        Ok(Event::from(row).with_user(creator))
    }

    async fn decorate_all(&self, rows: Vec<EventRow>) -> Result<Vec<Event>> {
        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            events.push(self.decorate(row).await?);
        }
        Ok(events)
    }
}
