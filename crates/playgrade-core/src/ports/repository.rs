use async_trait::async_trait;

use crate::domain::{
    FeedFilter, FeedPage, LikeTarget, NewPost, NewReply, NewUser, PageRequest, Post, PostView,
    Reply, ReplyView, User,
};
use crate::error::RepoError;

/// Lookup shared by every entity with a single-column primary key.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;
}

/// User repository with account-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, i32> {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Insert a user. Unique violations surface as `RepoError::Constraint`.
    async fn create(&self, user: NewUser) -> Result<User, RepoError>;

    async fn update_username(&self, id: i32, username: &str) -> Result<(), RepoError>;

    async fn update_password_hash(&self, id: i32, password_hash: &str) -> Result<(), RepoError>;

    async fn update_profile_picture(&self, id: i32, url: Option<&str>) -> Result<(), RepoError>;

    /// Every image URL the user's rows reference (profile, posts, replies).
    async fn image_urls(&self, id: i32) -> Result<Vec<String>, RepoError>;

    /// Delete the account and everything it owns, correcting the counters
    /// of other users' content the account liked or replied to.
    async fn delete(&self, id: i32) -> Result<(), RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i32> {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Delete a post; its replies and likes go with it.
    async fn delete(&self, id: i32) -> Result<(), RepoError>;

    /// A post with author details and whether `viewer` liked it.
    async fn find_view(&self, id: i32, viewer: Option<i32>)
    -> Result<Option<PostView>, RepoError>;

    /// Filtered, sorted page of posts plus the total matching count.
    async fn list(
        &self,
        filter: &FeedFilter,
        viewer: Option<i32>,
        page: PageRequest,
    ) -> Result<FeedPage<PostView>, RepoError>;
}

/// Reply repository. Keeps the parent's `reply_count` in step.
#[async_trait]
pub trait ReplyRepository: BaseRepository<Reply, i32> {
    /// Insert a reply and bump the parent's counter.
    /// `RepoError::NotFound` if the post does not exist.
    async fn create(&self, reply: NewReply) -> Result<Reply, RepoError>;

    /// Delete a reply and decrement the parent's counter, floored at zero.
    async fn delete(&self, id: i32) -> Result<(), RepoError>;

    /// Replies to a post, oldest first.
    async fn list_for_post(
        &self,
        post_id: i32,
        viewer: Option<i32>,
    ) -> Result<Vec<ReplyView>, RepoError>;
}

/// Likes on posts and replies.
#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// `RepoError::NotFound` if the target is missing,
    /// `RepoError::Constraint` if the user already liked it.
    async fn like(&self, user_id: i32, target: LikeTarget) -> Result<(), RepoError>;

    /// `RepoError::NotFound` if there is no such like.
    async fn unlike(&self, user_id: i32, target: LikeTarget) -> Result<(), RepoError>;
}

/// Follow relationships between users.
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// `RepoError::NotFound` if the followee is missing,
    /// `RepoError::Constraint` if already following.
    async fn follow(&self, follower_id: i32, followee_id: i32) -> Result<(), RepoError>;

    /// `RepoError::NotFound` if not following.
    async fn unfollow(&self, follower_id: i32, followee_id: i32) -> Result<(), RepoError>;

    async fn is_following(&self, follower_id: i32, followee_id: i32) -> Result<bool, RepoError>;
}
