use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::post::validate_body;
use crate::error::DomainError;

/// Reply entity - a short answer attached to a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    pub id: i32,
    pub post_id: i32,
    pub replier_id: i32,
    pub body: String,
    pub image_url: Option<String>,
    pub like_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReply {
    pub post_id: i32,
    pub replier_id: i32,
    pub body: String,
    pub image_url: Option<String>,
}

impl NewReply {
    pub fn new(post_id: i32, replier_id: i32, body: String) -> Result<Self, DomainError> {
        if body.trim().is_empty() {
            return Err(DomainError::validation("Post ID and body are required"));
        }
        validate_body(&body)?;

        Ok(Self {
            post_id,
            replier_id,
            body,
            image_url: None,
        })
    }

    pub fn with_image(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url;
        self
    }
}

/// A reply joined with its author and the caller's like state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyView {
    pub reply: Reply,
    pub username: String,
    pub profile_picture: Option<String>,
    pub liked: bool,
}
