//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Request to register a new user. Missing fields arrive as empty strings
/// so the handler can answer with a single "all fields are required" error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: i32,
}

/// Request to login.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response containing the access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// A user's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub user_id: i32,
    pub username: String,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateUsernameRequest {
    pub username: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdatePasswordRequest {
    pub new_password: String,
    pub current_password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilePictureResponse {
    pub message: String,
    pub profile_picture: String,
}

/// Plain acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Posts & replies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostResponse {
    pub message: String,
    pub post_id: i32,
}

/// A post as rendered in feeds and on the detail page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub post_id: i32,
    pub poster_id: i32,
    pub title: String,
    /// Single-letter category code (`G`, `F` or `M`).
    pub category: String,
    pub body: String,
    pub image_url: Option<String>,
    pub like_count: i32,
    pub reply_count: i32,
    pub created_at: String,
    pub username: String,
    pub profile_picture: Option<String>,
    pub liked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyResponse {
    pub reply_id: i32,
    pub post_id: i32,
    pub replier_id: i32,
    pub body: String,
    pub image_url: Option<String>,
    pub like_count: i32,
    pub created_at: String,
    pub username: String,
    pub profile_picture: Option<String>,
    pub liked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailResponse {
    pub post: PostResponse,
    pub replies: Vec<ReplyResponse>,
}

/// Query string of `GET /posts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PostListQuery {
    pub categories: Option<String>,
    pub users: Option<String>,
    pub age_range: Option<String>,
    pub sort_by: Option<String>,
    pub search_query: Option<String>,
    pub poster_id: Option<i32>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
    pub total_pages: u64,
    pub current_page: u64,
    pub total_posts: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReplyResponse {
    pub message: String,
    pub reply_id: i32,
}

// ---------------------------------------------------------------------------
// Likes & follows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LikeRequest {
    pub target_id: Option<i32>,
    #[serde(rename = "type")]
    pub target_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowRequest {
    pub followee_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowStatusResponse {
    pub is_following: bool,
}
