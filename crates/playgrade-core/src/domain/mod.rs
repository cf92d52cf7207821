//! Domain entities - the core business objects.

mod feed;
mod follow;
mod image;
mod like;
mod post;
mod reply;
mod user;

pub use feed::{
    AgeRange, Audience, DEFAULT_PAGE_SIZE, FeedFilter, FeedPage, MAX_PAGE_SIZE, PageRequest,
    SortOrder,
};
pub use follow::{Follow, validate_follow};
pub use image::{ALLOWED_IMAGE_EXTENSIONS, image_extension};
pub use like::LikeTarget;
pub use post::{BODY_MAX_CHARS, Category, NewPost, Post, PostView, TITLE_MAX_CHARS, validate_body};
pub use reply::{NewReply, Reply, ReplyView};
pub use user::{
    Actor, NewUser, PASSWORD_MIN_CHARS, USERNAME_MAX_CHARS, User, validate_email,
    validate_password, validate_username,
};
