// Registration workflow
//
// Event states: OPEN (available, no registration) and CLAIMED (unavailable,
// one registration). register moves OPEN -> CLAIMED through one atomic store
// call. What cancel does to the event depends on the configured policy.

use crate::config::CancellationPolicy;
use crate::storage::{models::ClaimOutcome, StorageBackend};
use eventhub_core::{id, parse_id, Error, Registration, Result};
use std::sync::Arc;

use super::{store_error, EventService, UserService};

pub struct RegistrationService {
    db: Arc<StorageBackend>,
    users: Arc<UserService>,
    events: Arc<EventService>,
    cancel_policy: CancellationPolicy,
}

impl RegistrationService {
    pub fn new(
        db: Arc<StorageBackend>,
        users: Arc<UserService>,
        events: Arc<EventService>,
        cancel_policy: CancellationPolicy,
    ) -> Self {
        Self {
            db,
            users,
            events,
            cancel_policy,
        }
    }

    /// Claim an open event for `user_id`.
    ///
    /// Returns the registration with the now-claimed event and the registrant
    /// embedded. A registrant whose account is gone cannot claim.
    pub async fn register(&self, event_id: &str, user_id: &str) -> Result<Registration> {
        let event_id = parse_id(id::EVENT, event_id)?;
        let user_id = parse_id(id::USER, user_id)?;

        let user = self
            .users
            .by_uuid(user_id)
            .await?
            .ok_or(Error::NotFound("User"))?;

        let outcome = self
            .db
            .claim_event(event_id, user_id)
            .await
            .map_err(store_error)?;

        let (registration, event) = match outcome {
            ClaimOutcome::Claimed {
                registration,
                event,
            } => (registration, event),
            ClaimOutcome::NotFound => return Err(Error::NotFound("Event")),
            ClaimOutcome::Unavailable => {
                tracing::debug!(event_id = %event_id, user_id = %user_id, "Event already claimed");
                return Err(Error::EventUnavailable(event_id));
            }
        };

        tracing::info!(
            registration_id = %registration.id,
            event_id = %event_id,
            user_id = %user_id,
            state = %event.state(),
            "Event registered"
        );

        let event = self.events.decorate(event).await?;
        Ok(Registration::from(registration)
            .with_event(Some(event))
            .with_user(Some(user)))
    }

    /// Delete a registration by its own id. Absence is `Ok(None)`.
    pub async fn cancel(&self, registration_id: &str) -> Result<Option<Registration>> {
        let registration_id = parse_id(id::REGISTRATION, registration_id)?;
        let next_state = self.cancel_policy.state_after_cancel();
        let reopen = next_state.is_available();

        let row = self
            .db
            .cancel_registration(registration_id, reopen)
            .await
            .map_err(store_error)?;

        if let Some(row) = &row {
            tracing::info!(
                registration_id = %row.id,
                event_id = %row.event_id,
                policy = %self.cancel_policy,
                event_state = %next_state,
                "Registration cancelled"
            );
        }
        Ok(row.map(Registration::from))
    }

    /// Registrations held by `user_id`, each with the registrant and the
    /// event (when it still exists) embedded
    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<Registration>> {
        let user_id = parse_id(id::USER, user_id)?;
        let rows = self
            .db
            .list_registrations_for_user(user_id)
            .await
            .map_err(store_error)?;

        let user = self.users.by_uuid(user_id).await?;
        let mut registrations = Vec::with_capacity(rows.len());
        for row in rows {
            let event = match self.db.get_event(row.event_id).await.map_err(store_error)? {
                Some(event) => Some(self.events.decorate(event).await?),
                None => None,
            };
            registrations.push(
                Registration::from(row)
                    .with_event(event)
                    .with_user(user.clone()),
            );
        }
        Ok(registrations)
    }
}
