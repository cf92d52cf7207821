use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

pub const USERNAME_MAX_CHARS: usize = 50;
pub const PASSWORD_MIN_CHARS: usize = 8;

/// User entity - represents a registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A user about to be inserted; the id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// The caller on whose behalf a mutation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i32,
    pub is_admin: bool,
}

impl Actor {
    pub fn new(user_id: i32, is_admin: bool) -> Self {
        Self { user_id, is_admin }
    }

    /// Owners and admins may modify a resource; everyone else is refused.
    pub fn authorize(&self, owner_id: i32) -> Result<(), DomainError> {
        if self.user_id == owner_id || self.is_admin {
            Ok(())
        } else {
            Err(DomainError::Forbidden)
        }
    }
}

pub fn validate_username(username: &str) -> Result<(), DomainError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("Username is required"));
    }
    if trimmed.chars().count() > USERNAME_MAX_CHARS {
        return Err(DomainError::validation(format!(
            "Username must not exceed {USERNAME_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), DomainError> {
    if email.is_empty() || !email.contains('@') {
        return Err(DomainError::validation("Invalid email address"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), DomainError> {
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(DomainError::validation(format!(
            "Password must be at least {PASSWORD_MIN_CHARS} characters"
        )));
    }
    Ok(())
}
