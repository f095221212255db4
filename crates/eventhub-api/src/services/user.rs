// User service: account lookup, credentials and profile management

use crate::storage::{
    models::{CreateUserRow, UpdateUserRow},
    password::{hash_password, verify_against_dummy, verify_password},
    StorageBackend,
};
use eventhub_core::{id, parse_id, AuthFailure, Error, NewUser, Result, User, UserPatch};
use std::sync::Arc;
use uuid::Uuid;

use super::store_error;

pub struct UserService {
    db: Arc<StorageBackend>,
}

impl UserService {
    pub fn new(db: Arc<StorageBackend>) -> Self {
        Self { db }
    }

    /// Resolve a user by id. Absence is `Ok(None)`.
    pub async fn by_id(&self, id: &str) -> Result<Option<User>> {
        let id = parse_id(id::USER, id)?;
        self.by_uuid(id).await
    }

    pub(crate) async fn by_uuid(&self, id: Uuid) -> Result<Option<User>> {
        let row = self.db.get_user(id).await.map_err(store_error)?;
        Ok(row.map(User::from))
    }

    pub async fn by_email_exists(&self, email: &str) -> Result<bool> {
        let row = self
            .db
            .get_user_by_email(email.trim())
            .await
            .map_err(store_error)?;
        Ok(row.is_some())
    }

    /// Check an email/password pair.
    ///
    /// Unknown email and wrong password fail with the same error.
    pub async fn validate_credentials(&self, email: &str, password: &str) -> Result<User> {
        let row = self
            .db
            .get_user_by_email(email.trim())
            .await
            .map_err(store_error)?;

        let Some(row) = row else {
            verify_against_dummy(password);
            return Err(Error::Auth(AuthFailure::InvalidCredentials));
        };

        let valid = verify_password(password, &row.password_hash).map_err(|e| {
            tracing::error!(user_id = %row.id, "Password verification error: {}", e);
            Error::Auth(AuthFailure::InvalidCredentials)
        })?;
        if !valid {
            return Err(Error::Auth(AuthFailure::InvalidCredentials));
        }

        Ok(row.into())
    }

    pub async fn signup(&self, input: NewUser) -> Result<User> {
        if self.by_email_exists(&input.email).await? {
            return Err(Error::conflict("Email is already registered"));
        }

        let password_hash = hash_password(&input.password)?;
        // The unique index still catches a signup racing this one
        let row = self
            .db
            .create_user(CreateUserRow {
                name: input.name,
                email: input.email,
                password_hash,
            })
            .await
            .map_err(store_error)?;

        tracing::info!(user_id = %row.id, "User signed up");
        Ok(row.into())
    }

    pub async fn list_all(&self) -> Result<Vec<User>> {
        let rows = self.db.list_users().await.map_err(store_error)?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    pub async fn update(&self, id: &str, patch: UserPatch) -> Result<Option<User>> {
        let id = parse_id(id::USER, id)?;
        patch.validate()?;

        let email = patch.email.map(|e| e.trim().to_string());
        if let Some(email) = &email {
            let owner = self
                .db
                .get_user_by_email(email)
                .await
                .map_err(store_error)?;
            if owner.is_some_and(|u| u.id != id) {
                return Err(Error::conflict("Email is already registered"));
            }
        }

        let password_hash = patch.password.as_deref().map(hash_password).transpose()?;
        let row = self
            .db
            .update_user(
                id,
                UpdateUserRow {
                    name: patch.name.map(|n| n.trim().to_string()),
                    email,
                    password_hash,
                },
            )
            .await
            .map_err(store_error)?;

        Ok(row.map(User::from))
    }

    pub async fn delete(&self, id: &str) -> Result<Option<User>> {
        let id = parse_id(id::USER, id)?;
        let row = self.db.delete_user(id).await.map_err(store_error)?;
        if let Some(row) = &row {
            tracing::info!(user_id = %row.id, "User deleted");
        }
        Ok(row.map(User::from))
    }
}
