use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

pub const TITLE_MAX_CHARS: usize = 100;
pub const BODY_MAX_CHARS: usize = 300;

/// Post category, stored as a single-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "G")]
    Games,
    #[serde(rename = "F")]
    FilmTv,
    #[serde(rename = "M")]
    Music,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Games, Category::FilmTv, Category::Music];

    pub fn code(self) -> &'static str {
        match self {
            Category::Games => "G",
            Category::FilmTv => "F",
            Category::Music => "M",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Games => "🎮 Games",
            Category::FilmTv => "🎥 Film/TV",
            Category::Music => "🎵 Music",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }
}

impl FromStr for Category {
    type Err = DomainError;

    /// Accepts the display label, the bare name or the stored code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let name = s
            .split_once(' ')
            .filter(|(prefix, _)| !prefix.is_ascii())
            .map(|(_, rest)| rest.trim())
            .unwrap_or(s);

        match name.to_ascii_lowercase().as_str() {
            "g" | "games" => Ok(Category::Games),
            "f" | "film/tv" | "film-tv" | "filmtv" => Ok(Category::FilmTv),
            "m" | "music" => Ok(Category::Music),
            _ => Err(DomainError::validation(format!(
                "Invalid category '{s}'. Must be Games, Film/TV or Music"
            ))),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Post entity - a categorized, image-bearing post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub poster_id: i32,
    pub title: String,
    pub body: String,
    pub category: Category,
    pub image_url: Option<String>,
    pub like_count: i32,
    pub reply_count: i32,
    pub created_at: DateTime<Utc>,
}

/// A validated post waiting to be inserted.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub poster_id: i32,
    pub title: String,
    pub body: String,
    pub category: Category,
    pub image_url: Option<String>,
}

impl NewPost {
    pub fn new(
        poster_id: i32,
        title: String,
        body: String,
        category: Category,
    ) -> Result<Self, DomainError> {
        let title = title.trim().to_string();
        if title.is_empty() || body.trim().is_empty() {
            return Err(DomainError::validation(
                "Title, body, and category are required",
            ));
        }
        if title.chars().count() > TITLE_MAX_CHARS {
            return Err(DomainError::validation(format!(
                "Title must not exceed {TITLE_MAX_CHARS} characters"
            )));
        }
        validate_body(&body)?;

        Ok(Self {
            poster_id,
            title,
            body,
            category,
            image_url: None,
        })
    }

    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}

/// A post joined with its author and the caller's like state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    pub post: Post,
    pub username: String,
    pub profile_picture: Option<String>,
    pub liked: bool,
}

/// Body text shared by posts and replies is capped in characters, not bytes.
pub fn validate_body(body: &str) -> Result<(), DomainError> {
    if body.chars().count() > BODY_MAX_CHARS {
        return Err(DomainError::validation(format!(
            "Body must not exceed {BODY_MAX_CHARS} characters"
        )));
    }
    Ok(())
}
