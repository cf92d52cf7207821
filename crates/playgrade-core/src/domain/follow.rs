use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Follow edge from `follower_id` to `followee_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Follow {
    pub follower_id: i32,
    pub followee_id: i32,
    pub created_at: DateTime<Utc>,
}

/// Rejects self-follows before any lookup happens.
pub fn validate_follow(follower_id: i32, followee_id: i32) -> Result<(), DomainError> {
    if follower_id == followee_id {
        return Err(DomainError::validation("You cannot follow yourself"));
    }
    Ok(())
}
