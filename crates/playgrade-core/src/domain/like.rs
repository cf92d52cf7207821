use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// What a like points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LikeTarget {
    Post(i32),
    Reply(i32),
}

impl LikeTarget {
    /// Build a target from the wire pair `{target_id, type}`.
    pub fn parse(kind: &str, target_id: i32) -> Result<Self, DomainError> {
        if target_id <= 0 {
            return Err(DomainError::validation("Invalid input"));
        }
        match kind {
            "post" => Ok(LikeTarget::Post(target_id)),
            "reply" => Ok(LikeTarget::Reply(target_id)),
            _ => Err(DomainError::validation("Invalid input")),
        }
    }

    pub fn id(self) -> i32 {
        match self {
            LikeTarget::Post(id) | LikeTarget::Reply(id) => id,
        }
    }

    /// Entity name used in "not found" messages.
    pub fn entity_name(self) -> &'static str {
        match self {
            LikeTarget::Post(_) => "Post",
            LikeTarget::Reply(_) => "Reply",
        }
    }
}
