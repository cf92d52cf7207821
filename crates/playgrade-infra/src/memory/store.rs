//! In-memory repositories - used as fallback when no database is configured.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use playgrade_core::domain::{
    Audience, FeedFilter, FeedPage, LikeTarget, NewPost, NewReply, NewUser, PageRequest, Post,
    PostView, Reply, ReplyView, SortOrder, User,
};
use playgrade_core::error::RepoError;
use playgrade_core::ports::{
    BaseRepository, FollowRepository, LikeRepository, PostRepository, ReplyRepository,
    UserRepository,
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    posts: BTreeMap<i32, Post>,
    replies: BTreeMap<i32, Reply>,
    likes: HashSet<(i32, LikeTarget)>,
    follows: HashSet<(i32, i32)>,
    last_user_id: i32,
    last_post_id: i32,
    last_reply_id: i32,
}

fn next_id(last: &mut i32) -> i32 {
    *last += 1;
    *last
}

fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

impl Tables {
    fn liked(&self, viewer: Option<i32>, target: LikeTarget) -> bool {
        viewer.is_some_and(|user_id| self.likes.contains(&(user_id, target)))
    }

    fn post_view(&self, post: &Post, viewer: Option<i32>) -> Option<PostView> {
        let author = self.users.get(&post.poster_id)?;
        Some(PostView {
            post: post.clone(),
            username: author.username.clone(),
            profile_picture: author.profile_picture.clone(),
            liked: self.liked(viewer, LikeTarget::Post(post.id)),
        })
    }

    fn like_count_mut(&mut self, target: LikeTarget) -> Option<&mut i32> {
        match target {
            LikeTarget::Post(id) => self.posts.get_mut(&id).map(|p| &mut p.like_count),
            LikeTarget::Reply(id) => self.replies.get_mut(&id).map(|r| &mut r.like_count),
        }
    }

    /// Remove a reply and every like on it. Parent counters are left alone.
    fn remove_reply(&mut self, id: i32) -> Option<Reply> {
        let reply = self.replies.remove(&id)?;
        self.likes
            .retain(|(_, target)| *target != LikeTarget::Reply(id));
        Some(reply)
    }

    /// Remove a post together with its replies and likes.
    fn remove_post(&mut self, id: i32) -> Option<Post> {
        let post = self.posts.remove(&id)?;
        let reply_ids: Vec<i32> = self
            .replies
            .values()
            .filter(|r| r.post_id == id)
            .map(|r| r.id)
            .collect();
        for reply_id in reply_ids {
            self.remove_reply(reply_id);
        }
        self.likes
            .retain(|(_, target)| *target != LikeTarget::Post(id));
        Some(post)
    }

    fn matches(
        &self,
        post: &Post,
        filter: &FeedFilter,
        viewer: Option<i32>,
        cutoff: Option<DateTime<Utc>>,
        search: Option<&str>,
    ) -> bool {
        if !filter.categories.is_empty() && !filter.categories.contains(&post.category) {
            return false;
        }
        if filter.poster_id.is_some_and(|id| id != post.poster_id) {
            return false;
        }
        if filter.audience == Audience::Followed {
            let follows = viewer.is_some_and(|v| self.follows.contains(&(v, post.poster_id)));
            if !follows {
                return false;
            }
        }
        if cutoff.is_some_and(|c| post.created_at < c) {
            return false;
        }
        if let Some(term) = search {
            return post.title.to_lowercase().contains(term)
                || post.body.to_lowercase().contains(term);
        }
        true
    }
}

/// All five repositories over one set of tables behind an async RwLock.
///
/// Every operation takes the lock once, so counter updates are atomic just
/// like the transactional Postgres versions. Data is lost on process restart.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[async_trait]
impl BaseRepository<User, i32> for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.email == new_user.email) {
            return Err(RepoError::Constraint("email already registered".to_string()));
        }
        if tables.users.values().any(|u| u.username == new_user.username) {
            return Err(RepoError::Constraint("username already taken".to_string()));
        }

        let id = next_id(&mut tables.last_user_id);
        let user = User {
            id,
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            is_admin: false,
            profile_picture: None,
            created_at: Utc::now(),
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn update_username(&self, id: i32, username: &str) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;

        if tables
            .users
            .values()
            .any(|u| u.id != id && u.username == username)
        {
            return Err(RepoError::Constraint("username already taken".to_string()));
        }

        let user = tables.users.get_mut(&id).ok_or(RepoError::NotFound)?;
        user.username = username.to_string();
        Ok(())
    }

    async fn update_password_hash(&self, id: i32, password_hash: &str) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let user = tables.users.get_mut(&id).ok_or(RepoError::NotFound)?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn update_profile_picture(&self, id: i32, url: Option<&str>) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let user = tables.users.get_mut(&id).ok_or(RepoError::NotFound)?;
        user.profile_picture = url.map(str::to_string);
        Ok(())
    }

    async fn image_urls(&self, id: i32) -> Result<Vec<String>, RepoError> {
        let tables = self.tables.read().await;

        let profile = tables
            .users
            .get(&id)
            .and_then(|u| u.profile_picture.clone());
        let posts = tables
            .posts
            .values()
            .filter(|p| p.poster_id == id)
            .filter_map(|p| p.image_url.clone());
        // Replies by anyone on this user's posts cascade with the posts.
        let replies = tables
            .replies
            .values()
            .filter(|r| {
                r.replier_id == id
                    || tables
                        .posts
                        .get(&r.post_id)
                        .is_some_and(|p| p.poster_id == id)
            })
            .filter_map(|r| r.image_url.clone());

        Ok(profile.into_iter().chain(posts).chain(replies).collect())
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&id) {
            return Err(RepoError::NotFound);
        }

        let liked: Vec<LikeTarget> = tables
            .likes
            .iter()
            .filter(|(user_id, _)| *user_id == id)
            .map(|(_, target)| *target)
            .collect();
        for target in liked {
            if let Some(count) = tables.like_count_mut(target) {
                *count = (*count - 1).max(0);
            }
            tables.likes.remove(&(id, target));
        }

        let own_replies: Vec<(i32, i32)> = tables
            .replies
            .values()
            .filter(|r| r.replier_id == id)
            .map(|r| (r.id, r.post_id))
            .collect();
        for (reply_id, post_id) in own_replies {
            tables.remove_reply(reply_id);
            if let Some(parent) = tables.posts.get_mut(&post_id) {
                parent.reply_count = (parent.reply_count - 1).max(0);
            }
        }

        let own_posts: Vec<i32> = tables
            .posts
            .values()
            .filter(|p| p.poster_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in own_posts {
            tables.remove_post(post_id);
        }

        tables
            .follows
            .retain(|(follower, followee)| *follower != id && *followee != id);
        tables.users.remove(&id);

        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

#[async_trait]
impl BaseRepository<Post, i32> for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&new_post.poster_id) {
            return Err(RepoError::NotFound);
        }

        let id = next_id(&mut tables.last_post_id);
        let post = Post {
            id,
            poster_id: new_post.poster_id,
            title: new_post.title,
            body: new_post.body,
            category: new_post.category,
            image_url: new_post.image_url,
            like_count: 0,
            reply_count: 0,
            created_at: Utc::now(),
        };
        tables.posts.insert(id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.remove_post(id).map(|_| ()).ok_or(RepoError::NotFound)
    }

    async fn find_view(
        &self,
        id: i32,
        viewer: Option<i32>,
    ) -> Result<Option<PostView>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .get(&id)
            .and_then(|post| tables.post_view(post, viewer)))
    }

    async fn list(
        &self,
        filter: &FeedFilter,
        viewer: Option<i32>,
        page: PageRequest,
    ) -> Result<FeedPage<PostView>, RepoError> {
        let tables = self.tables.read().await;

        let cutoff = filter.age.cutoff(Utc::now());
        let search = filter.search_term().map(str::to_lowercase);

        let mut matching: Vec<&Post> = tables
            .posts
            .values()
            .filter(|post| tables.matches(post, filter, viewer, cutoff, search.as_deref()))
            .collect();

        matching.sort_by(|a, b| {
            let primary = match filter.sort {
                SortOrder::MostLiked => b.like_count.cmp(&a.like_count),
                SortOrder::MostComments => b.reply_count.cmp(&a.reply_count),
                SortOrder::Newest => Ordering::Equal,
            };
            primary
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(to_usize(page.offset()))
            .take(to_usize(page.limit))
            .filter_map(|post| tables.post_view(post, viewer))
            .collect();

        Ok(FeedPage::new(items, total, page))
    }
}

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

#[async_trait]
impl BaseRepository<Reply, i32> for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<Reply>, RepoError> {
        Ok(self.tables.read().await.replies.get(&id).cloned())
    }
}

#[async_trait]
impl ReplyRepository for InMemoryStore {
    async fn create(&self, new_reply: NewReply) -> Result<Reply, RepoError> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&new_reply.replier_id) {
            return Err(RepoError::NotFound);
        }
        let parent = tables
            .posts
            .get_mut(&new_reply.post_id)
            .ok_or(RepoError::NotFound)?;
        parent.reply_count += 1;

        let id = next_id(&mut tables.last_reply_id);
        let reply = Reply {
            id,
            post_id: new_reply.post_id,
            replier_id: new_reply.replier_id,
            body: new_reply.body,
            image_url: new_reply.image_url,
            like_count: 0,
            created_at: Utc::now(),
        };
        tables.replies.insert(id, reply.clone());
        Ok(reply)
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;

        let reply = tables.remove_reply(id).ok_or(RepoError::NotFound)?;
        if let Some(parent) = tables.posts.get_mut(&reply.post_id) {
            parent.reply_count = (parent.reply_count - 1).max(0);
        }
        Ok(())
    }

    async fn list_for_post(
        &self,
        post_id: i32,
        viewer: Option<i32>,
    ) -> Result<Vec<ReplyView>, RepoError> {
        let tables = self.tables.read().await;

        let mut replies: Vec<&Reply> = tables
            .replies
            .values()
            .filter(|r| r.post_id == post_id)
            .collect();
        replies.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(replies
            .into_iter()
            .filter_map(|reply| {
                let author = tables.users.get(&reply.replier_id)?;
                Some(ReplyView {
                    reply: reply.clone(),
                    username: author.username.clone(),
                    profile_picture: author.profile_picture.clone(),
                    liked: tables.liked(viewer, LikeTarget::Reply(reply.id)),
                })
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Likes and follows
// ---------------------------------------------------------------------------

#[async_trait]
impl LikeRepository for InMemoryStore {
    async fn like(&self, user_id: i32, target: LikeTarget) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;

        if tables.like_count_mut(target).is_none() {
            return Err(RepoError::NotFound);
        }
        if !tables.likes.insert((user_id, target)) {
            return Err(RepoError::Constraint(format!(
                "{} already liked",
                target.entity_name()
            )));
        }
        if let Some(count) = tables.like_count_mut(target) {
            *count += 1;
        }
        Ok(())
    }

    async fn unlike(&self, user_id: i32, target: LikeTarget) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;

        if !tables.likes.remove(&(user_id, target)) {
            return Err(RepoError::NotFound);
        }
        if let Some(count) = tables.like_count_mut(target) {
            *count = (*count - 1).max(0);
        }
        Ok(())
    }
}

#[async_trait]
impl FollowRepository for InMemoryStore {
    async fn follow(&self, follower_id: i32, followee_id: i32) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&followee_id) {
            return Err(RepoError::NotFound);
        }
        if !tables.follows.insert((follower_id, followee_id)) {
            return Err(RepoError::Constraint("Already following".to_string()));
        }
        Ok(())
    }

    async fn unfollow(&self, follower_id: i32, followee_id: i32) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;

        if tables.follows.remove(&(follower_id, followee_id)) {
            Ok(())
        } else {
            Err(RepoError::NotFound)
        }
    }

    async fn is_following(&self, follower_id: i32, followee_id: i32) -> Result<bool, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.follows.contains(&(follower_id, followee_id)))
    }
}
