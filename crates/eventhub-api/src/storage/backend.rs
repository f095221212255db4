// Storage backend abstraction
// Decision: Use enum dispatch for simplicity over trait objects
// Decision: Every call is bounded by a deadline; an elapsed deadline is a store error
//
// StorageBackend is built once in main and handed to each service. Dropping a
// timed-out future also drops any open transaction, which rolls it back.
// One window remains: a deadline that fires after COMMIT reached Postgres but
// before its reply arrived reports an error for a write that did land. A
// claim caught there answers 500 while the registration stands; the next
// register on that event sees 409.

use anyhow::{anyhow, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use super::memory::InMemoryDatabase;
use super::models::*;
use super::repositories::Database;

/// Default per-call deadline
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Clone)]
enum Store {
    /// PostgreSQL database (production)
    Postgres(Database),
    /// In-memory database (dev mode)
    InMemory(Arc<InMemoryDatabase>),
}

/// Storage backend that can be either PostgreSQL or in-memory
#[derive(Clone)]
pub struct StorageBackend {
    store: Store,
    call_timeout: Duration,
}

impl StorageBackend {
    /// Connect to PostgreSQL and apply migrations
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let db = Database::from_url(database_url, max_connections).await?;
        db.migrate().await?;
        Ok(Self {
            store: Store::Postgres(db),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        })
    }

    /// Create an in-memory storage backend
    pub fn in_memory() -> Self {
        Self {
            store: Store::InMemory(Arc::new(InMemoryDatabase::new())),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Check if this is dev mode (in-memory)
    pub fn is_dev_mode(&self) -> bool {
        matches!(self.store, Store::InMemory(_))
    }

    /// Release pooled connections. No-op for the in-memory backend.
    pub async fn close(&self) {
        if let Store::Postgres(db) = &self.store {
            db.close().await;
        }
    }

    /// Make user reads on the in-memory store fail
    #[cfg(test)]
    pub(crate) fn fail_user_reads(&self, fail: bool) {
        if let Store::InMemory(db) = &self.store {
            db.set_fail_user_reads(fail);
        }
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.call_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    op,
                    timeout_ms = self.call_timeout.as_millis() as u64,
                    "Store call exceeded deadline"
                );
                Err(anyhow!(
                    "store call {} timed out after {}ms",
                    op,
                    self.call_timeout.as_millis()
                ))
            }
        }
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        self.bounded("create_user", async {
            match &self.store {
                Store::Postgres(db) => db.create_user(input).await,
                Store::InMemory(db) => db.create_user(input).await,
            }
        })
        .await
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        self.bounded("get_user", async {
            match &self.store {
                Store::Postgres(db) => db.get_user(id).await,
                Store::InMemory(db) => db.get_user(id).await,
            }
        })
        .await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.bounded("get_user_by_email", async {
            match &self.store {
                Store::Postgres(db) => db.get_user_by_email(email).await,
                Store::InMemory(db) => db.get_user_by_email(email).await,
            }
        })
        .await
    }

    pub async fn list_users(&self) -> Result<Vec<UserRow>> {
        self.bounded("list_users", async {
            match &self.store {
                Store::Postgres(db) => db.list_users().await,
                Store::InMemory(db) => db.list_users().await,
            }
        })
        .await
    }

    pub async fn update_user(&self, id: Uuid, input: UpdateUserRow) -> Result<Option<UserRow>> {
        self.bounded("update_user", async {
            match &self.store {
                Store::Postgres(db) => db.update_user(id, input).await,
                Store::InMemory(db) => db.update_user(id, input).await,
            }
        })
        .await
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        self.bounded("delete_user", async {
            match &self.store {
                Store::Postgres(db) => db.delete_user(id).await,
                Store::InMemory(db) => db.delete_user(id).await,
            }
        })
        .await
    }

    // ============================================
    // Events
    // ============================================

    pub async fn create_event(&self, input: CreateEventRow) -> Result<EventRow> {
        self.bounded("create_event", async {
            match &self.store {
                Store::Postgres(db) => db.create_event(input).await,
                Store::InMemory(db) => db.create_event(input).await,
            }
        })
        .await
    }

    pub async fn get_event(&self, id: Uuid) -> Result<Option<EventRow>> {
        self.bounded("get_event", async {
            match &self.store {
                Store::Postgres(db) => db.get_event(id).await,
                Store::InMemory(db) => db.get_event(id).await,
            }
        })
        .await
    }

    pub async fn list_events(&self, available_only: bool) -> Result<Vec<EventRow>> {
        self.bounded("list_events", async {
            match &self.store {
                Store::Postgres(db) => db.list_events(available_only).await,
                Store::InMemory(db) => db.list_events(available_only).await,
            }
        })
        .await
    }

    pub async fn update_event(&self, id: Uuid, input: UpdateEventRow) -> Result<Option<EventRow>> {
        self.bounded("update_event", async {
            match &self.store {
                Store::Postgres(db) => db.update_event(id, input).await,
                Store::InMemory(db) => db.update_event(id, input).await,
            }
        })
        .await
    }

    pub async fn delete_event(&self, id: Uuid) -> Result<Option<EventRow>> {
        self.bounded("delete_event", async {
            match &self.store {
                Store::Postgres(db) => db.delete_event(id).await,
                Store::InMemory(db) => db.delete_event(id).await,
            }
        })
        .await
    }

    // ============================================
    // Registrations
    // ============================================

    /// Atomically take an event's registration slot
    pub async fn claim_event(&self, event_id: Uuid, user_id: Uuid) -> Result<ClaimOutcome> {
        self.bounded("claim_event", async {
            match &self.store {
                Store::Postgres(db) => db.claim_event(event_id, user_id).await,
                Store::InMemory(db) => db.claim_event(event_id, user_id).await,
            }
        })
        .await
    }

    pub async fn cancel_registration(
        &self,
        id: Uuid,
        reopen_event: bool,
    ) -> Result<Option<RegistrationRow>> {
        self.bounded("cancel_registration", async {
            match &self.store {
                Store::Postgres(db) => db.cancel_registration(id, reopen_event).await,
                Store::InMemory(db) => db.cancel_registration(id, reopen_event).await,
            }
        })
        .await
    }

    pub async fn list_registrations_for_user(&self, user_id: Uuid) -> Result<Vec<RegistrationRow>> {
        self.bounded("list_registrations_for_user", async {
            match &self.store {
                Store::Postgres(db) => db.list_registrations_for_user(user_id).await,
                Store::InMemory(db) => db.list_registrations_for_user(user_id).await,
            }
        })
        .await
    }
}
