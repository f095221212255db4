// Repository layer for PostgreSQL
// Decision: Runtime-checked queries (query_as) so builds need no live database
// Decision: No foreign keys; registrations are joined in application code

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::*;
use super::UniqueViolation;

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at";
const EVENT_COLUMNS: &str =
    "id, name, description, location, date_time, is_available, user_id, created_at, updated_at";
const REGISTRATION_COLUMNS: &str = "id, event_id, user_id, created_at";

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create database connection from URL
    pub async fn from_url(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;
        Ok(Self { pool })
    }

    /// Apply embedded migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_email)?;

        Ok(row)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_users(&self) -> Result<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn update_user(&self, id: Uuid, input: UpdateUserRow) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique_email)?;

        Ok(row)
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "DELETE FROM users WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    // ============================================
    // Events
    // ============================================

    pub async fn create_event(&self, input: CreateEventRow) -> Result<EventRow> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            INSERT INTO events (id, name, description, location, date_time, is_available, user_id)
            VALUES ($1, $2, $3, $4, $5, TRUE, $6)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.location)
        .bind(input.date_time)
        .bind(input.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_event(&self, id: Uuid) -> Result<Option<EventRow>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// List events, optionally only those still open for registration
    pub async fn list_events(&self, available_only: bool) -> Result<Vec<EventRow>> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events
            WHERE ($1 = FALSE OR is_available)
            ORDER BY created_at ASC
            "#
        ))
        .bind(available_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn update_event(&self, id: Uuid, input: UpdateEventRow) -> Result<Option<EventRow>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            UPDATE events
            SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                location = COALESCE($4, location),
                date_time = COALESCE($5, date_time),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.location)
        .bind(input.date_time)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn delete_event(&self, id: Uuid) -> Result<Option<EventRow>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "DELETE FROM events WHERE id = $1 RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    // ============================================
    // Registrations
    // ============================================

    /// Flip availability and insert the registration in one transaction.
    ///
    /// The conditional UPDATE is the compare-and-swap: of two concurrent
    /// claims only one sees `is_available` still true. The call deadline
    /// covers COMMIT too; see the note in `backend.rs`.
    pub async fn claim_event(&self, event_id: Uuid, user_id: Uuid) -> Result<ClaimOutcome> {
        let mut tx = self.pool.begin().await?;

        let event = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            UPDATE events
            SET is_available = FALSE, updated_at = NOW()
            WHERE id = $1 AND is_available
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(event_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(event) = event else {
            let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM events WHERE id = $1")
                .bind(event_id)
                .fetch_optional(&mut *tx)
                .await?;
            tx.rollback().await?;
            return Ok(match exists {
                Some(_) => ClaimOutcome::Unavailable,
                None => ClaimOutcome::NotFound,
            });
        };

        let inserted = sqlx::query_as::<_, RegistrationRow>(&format!(
            r#"
            INSERT INTO registrations (id, event_id, user_id)
            VALUES ($1, $2, $3)
            RETURNING {REGISTRATION_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await;

        let registration = match inserted {
            Ok(row) => row,
            // A stale registration still holds the slot
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                tx.rollback().await?;
                return Ok(ClaimOutcome::Unavailable);
            }
            Err(e) => return Err(e.into()),
        };

        tx.commit().await?;

        Ok(ClaimOutcome::Claimed {
            registration,
            event,
        })
    }

    /// Delete a registration, reopening its event in the same transaction
    /// when `reopen_event` is set
    pub async fn cancel_registration(
        &self,
        id: Uuid,
        reopen_event: bool,
    ) -> Result<Option<RegistrationRow>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, RegistrationRow>(&format!(
            "DELETE FROM registrations WHERE id = $1 RETURNING {REGISTRATION_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        if let (Some(registration), true) = (&row, reopen_event) {
            sqlx::query(
                r#"
                UPDATE events
                SET is_available = TRUE, updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(registration.event_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(row)
    }

    pub async fn list_registrations_for_user(&self, user_id: Uuid) -> Result<Vec<RegistrationRow>> {
        let rows = sqlx::query_as::<_, RegistrationRow>(&format!(
            r#"
            SELECT {REGISTRATION_COLUMNS}
            FROM registrations
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

fn map_unique_email(e: sqlx::Error) -> anyhow::Error {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return UniqueViolation::email().into();
        }
    }
    e.into()
}
