// Input validation helpers shared by the typed inputs

use crate::error::{Error, Result};

/// Unwrap a required field, treating missing and blank values alike
pub fn required(field: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::validation(format!("{field} is required"))),
    }
}

pub fn non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Minimal shape check; deliverability is not our concern
pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(Error::validation("email is not a valid address")),
    }
}
