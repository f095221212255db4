// User domain types
//
// The password hash never leaves the storage layer; User is the public view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::{Error, Result};
use crate::validate::{non_blank, validate_email};

/// Registered account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated signup input
#[derive(Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    pub fn new(
        name: Option<String>,
        email: Option<String>,
        password: Option<String>,
    ) -> Result<Self> {
        let email = crate::validate::required("email", email)?;
        validate_email(&email)?;
        let password = crate::validate::required("password", password)?;

        Ok(Self {
            name: name.map(|n| n.trim().to_string()).unwrap_or_default(),
            email: email.trim().to_string(),
            password,
        })
    }
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Partial update of the caller's own profile. Only listed fields can change.
#[derive(Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// New plaintext password; hashed before it reaches storage
    #[serde(default)]
    pub password: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none()
    }

    /// Reject empty patches and blank values before anything is merged
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::validation("No fields to update"));
        }
        if let Some(name) = &self.name {
            non_blank("name", name)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(password) = &self.password {
            non_blank("password", password)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for UserPatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserPatch")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
