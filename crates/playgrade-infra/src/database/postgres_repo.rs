//! PostgreSQL repository implementations.
//!
//! Every operation that touches a denormalized counter runs in a transaction
//! and locks the counted row first, so concurrent likes and replies cannot
//! lose updates.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{
    Alias, Condition, Expr, Func, IntoColumnRef, LikeExpr, Order, Query, SelectStatement,
    SimpleExpr,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait,
    FromQueryResult, QueryFilter, QuerySelect, Set, TransactionTrait,
};

use playgrade_core::domain::{
    Audience, FeedFilter, FeedPage, Follow, LikeTarget, NewPost, NewReply, NewUser, PageRequest,
    Post, PostView, Reply, ReplyView, SortOrder, User,
};
use playgrade_core::error::RepoError;
use playgrade_core::ports::{
    BaseRepository, FollowRepository, LikeRepository, PostRepository, ReplyRepository,
    UserRepository,
};

use super::entity::follow::{self, Entity as FollowEntity};
use super::entity::like::{self, Entity as LikeEntity};
use super::entity::post::{self, CategoryCode, Entity as PostEntity};
use super::entity::reply::{self, Entity as ReplyEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL reply repository.
pub type PostgresReplyRepository = PostgresBaseRepository<ReplyEntity>;

/// PostgreSQL like repository.
pub type PostgresLikeRepository = PostgresBaseRepository<LikeEntity>;

/// PostgreSQL follow repository.
pub type PostgresFollowRepository = PostgresBaseRepository<FollowEntity>;

/// Mask an email address for logging to avoid PII in logs.
fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{first}***@{domain}")
        }
        None => "***".to_string(),
    }
}

async fn begin(db: &sea_orm::DbConn) -> Result<DatabaseTransaction, RepoError> {
    db.begin().await.map_err(map_db_err)
}

async fn commit(txn: DatabaseTransaction) -> Result<(), RepoError> {
    txn.commit().await.map_err(map_db_err)
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn create(&self, new_user: NewUser) -> Result<User, RepoError> {
        let model = user::ActiveModel {
            username: Set(new_user.username),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(map_db_err)?;

        tracing::info!(user_id = model.user_id, "User created");
        Ok(model.into())
    }

    async fn update_username(&self, id: i32, username: &str) -> Result<(), RepoError> {
        self.update_column(id, user::Column::Username, Expr::value(username))
            .await
    }

    async fn update_password_hash(&self, id: i32, password_hash: &str) -> Result<(), RepoError> {
        self.update_column(id, user::Column::PasswordHash, Expr::value(password_hash))
            .await
    }

    async fn update_profile_picture(&self, id: i32, url: Option<&str>) -> Result<(), RepoError> {
        self.update_column(
            id,
            user::Column::ProfilePicture,
            Expr::value(url.map(str::to_owned)),
        )
        .await
    }

    async fn image_urls(&self, id: i32) -> Result<Vec<String>, RepoError> {
        let mut urls = Vec::new();

        if let Some(user) = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
        {
            urls.extend(user.profile_picture);
        }

        let post_images: Vec<Option<String>> = PostEntity::find()
            .select_only()
            .column(post::Column::ImageUrl)
            .filter(post::Column::PosterId.eq(id))
            .filter(post::Column::ImageUrl.is_not_null())
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        // Replies by anyone on this user's posts cascade with the posts.
        let own_posts = Query::select()
            .column(post::Column::PostId)
            .from(PostEntity)
            .and_where(post::Column::PosterId.eq(id))
            .to_owned();
        let reply_images: Vec<Option<String>> = ReplyEntity::find()
            .select_only()
            .column(reply::Column::ImageUrl)
            .filter(
                Condition::any()
                    .add(reply::Column::ReplierId.eq(id))
                    .add(reply::Column::PostId.in_subquery(own_posts)),
            )
            .filter(reply::Column::ImageUrl.is_not_null())
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        urls.extend(post_images.into_iter().flatten());
        urls.extend(reply_images.into_iter().flatten());
        Ok(urls)
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let txn = begin(&self.db).await?;

        if UserEntity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(map_db_err)?
            .is_none()
        {
            return Err(RepoError::NotFound);
        }

        // Likes cascade away with the user; take them back off the counters first.
        let liked_posts = Query::select()
            .column(like::Column::PostId)
            .from(LikeEntity)
            .and_where(like::Column::UserId.eq(id))
            .and_where(like::Column::PostId.is_not_null())
            .to_owned();
        PostEntity::update_many()
            .col_expr(
                post::Column::LikeCount,
                Expr::col(post::Column::LikeCount).sub(1),
            )
            .filter(post::Column::PostId.in_subquery(liked_posts))
            .filter(post::Column::LikeCount.gt(0))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        let liked_replies = Query::select()
            .column(like::Column::ReplyId)
            .from(LikeEntity)
            .and_where(like::Column::UserId.eq(id))
            .and_where(like::Column::ReplyId.is_not_null())
            .to_owned();
        ReplyEntity::update_many()
            .col_expr(
                reply::Column::LikeCount,
                Expr::col(reply::Column::LikeCount).sub(1),
            )
            .filter(reply::Column::ReplyId.in_subquery(liked_replies))
            .filter(reply::Column::LikeCount.gt(0))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        let replied: Vec<(i32, i64)> = ReplyEntity::find()
            .select_only()
            .column(reply::Column::PostId)
            .column_as(Expr::col(reply::Column::ReplyId).count(), "replies")
            .filter(reply::Column::ReplierId.eq(id))
            .group_by(reply::Column::PostId)
            .into_tuple()
            .all(&txn)
            .await
            .map_err(map_db_err)?;

        for (post_id, count) in replied {
            let count = i32::try_from(count).unwrap_or(i32::MAX);
            PostEntity::update_many()
                .col_expr(
                    post::Column::ReplyCount,
                    Expr::cust_with_values("GREATEST(reply_count - $1, 0)", [count]),
                )
                .filter(post::Column::PostId.eq(post_id))
                .filter(post::Column::PosterId.ne(id))
                .exec(&txn)
                .await
                .map_err(map_db_err)?;
        }

        UserEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        commit(txn).await?;
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }
}

impl PostgresUserRepository {
    async fn update_column(
        &self,
        id: i32,
        column: user::Column,
        value: SimpleExpr,
    ) -> Result<(), RepoError> {
        let result = UserEntity::update_many()
            .col_expr(column, value)
            .filter(user::Column::UserId.eq(id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

#[derive(Debug, FromQueryResult)]
struct PostViewRow {
    post_id: i32,
    poster_id: i32,
    title: String,
    body: String,
    category: CategoryCode,
    image_url: Option<String>,
    like_count: i32,
    reply_count: i32,
    created_at: DateTimeWithTimeZone,
    username: String,
    profile_picture: Option<String>,
    liked: bool,
}

impl From<PostViewRow> for PostView {
    fn from(row: PostViewRow) -> Self {
        Self {
            post: Post {
                id: row.post_id,
                poster_id: row.poster_id,
                title: row.title,
                body: row.body,
                category: row.category.into(),
                image_url: row.image_url,
                like_count: row.like_count,
                reply_count: row.reply_count,
                created_at: row.created_at.into(),
            },
            username: row.username,
            profile_picture: row.profile_picture,
            liked: row.liked,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    total: i64,
}

/// `EXISTS` over the viewer's likes on `target`, or a constant false for guests.
fn liked_expr<C>(viewer: Option<i32>, like_column: like::Column, target: C) -> SimpleExpr
where
    C: IntoColumnRef,
{
    match viewer {
        Some(user_id) => Expr::exists(
            Query::select()
                .expr(Expr::val(1))
                .from(LikeEntity)
                .and_where(Expr::col((LikeEntity, like_column)).equals(target))
                .and_where(like::Column::UserId.eq(user_id))
                .to_owned(),
        ),
        None => Expr::val(false).into(),
    }
}

fn post_view_select(viewer: Option<i32>) -> SelectStatement {
    Query::select()
        .columns(
            [
                post::Column::PostId,
                post::Column::PosterId,
                post::Column::Title,
                post::Column::Body,
                post::Column::Category,
                post::Column::ImageUrl,
                post::Column::LikeCount,
                post::Column::ReplyCount,
                post::Column::CreatedAt,
            ]
            .map(|column| (PostEntity, column)),
        )
        .columns([user::Column::Username, user::Column::ProfilePicture].map(|c| (UserEntity, c)))
        .expr_as(
            liked_expr(
                viewer,
                like::Column::PostId,
                (PostEntity, post::Column::PostId),
            ),
            Alias::new("liked"),
        )
        .from(PostEntity)
        .inner_join(
            UserEntity,
            Expr::col((UserEntity, user::Column::UserId))
                .equals((PostEntity, post::Column::PosterId)),
        )
        .to_owned()
}

/// Lowercased `%term%` with LIKE wildcards in the term escaped.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn feed_condition(filter: &FeedFilter, viewer: Option<i32>) -> Condition {
    let mut condition = Condition::all();

    if !filter.categories.is_empty() {
        condition = condition.add(
            post::Column::Category.is_in(filter.categories.iter().map(|category| category.code())),
        );
    }

    if let Some(poster_id) = filter.poster_id {
        condition = condition.add(post::Column::PosterId.eq(poster_id));
    }

    if let (Audience::Followed, Some(follower_id)) = (filter.audience, viewer) {
        condition = condition.add(
            post::Column::PosterId.in_subquery(
                Query::select()
                    .column(follow::Column::FolloweeId)
                    .from(FollowEntity)
                    .and_where(follow::Column::FollowerId.eq(follower_id))
                    .to_owned(),
            ),
        );
    }

    if let Some(cutoff) = filter.age.cutoff(Utc::now()) {
        condition = condition.add(post::Column::CreatedAt.gte(cutoff));
    }

    if let Some(term) = filter.search_term() {
        let pattern = like_pattern(term);
        condition = condition.add(
            Condition::any()
                .add(
                    Expr::expr(Func::lower(Expr::col((PostEntity, post::Column::Title))))
                        .like(LikeExpr::new(pattern.clone()).escape('\\')),
                )
                .add(
                    Expr::expr(Func::lower(Expr::col((PostEntity, post::Column::Body))))
                        .like(LikeExpr::new(pattern).escape('\\')),
                ),
        );
    }

    condition
}

fn apply_sort(stmt: &mut SelectStatement, sort: SortOrder) {
    match sort {
        SortOrder::MostLiked => {
            stmt.order_by((PostEntity, post::Column::LikeCount), Order::Desc);
        }
        SortOrder::MostComments => {
            stmt.order_by((PostEntity, post::Column::ReplyCount), Order::Desc);
        }
        SortOrder::Newest => {}
    }
    stmt.order_by((PostEntity, post::Column::CreatedAt), Order::Desc)
        .order_by((PostEntity, post::Column::PostId), Order::Desc);
}

impl PostgresPostRepository {
    async fn fetch_views(&self, stmt: &SelectStatement) -> Result<Vec<PostView>, RepoError> {
        let backend = self.db.get_database_backend();
        let rows = PostViewRow::find_by_statement(backend.build(stmt))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let model = post::ActiveModel::from(new_post)
            .insert(&self.db)
            .await
            .map_err(map_db_err)?;

        tracing::info!(post_id = model.post_id, poster_id = model.poster_id, "Post created");
        Ok(model.into())
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn find_view(
        &self,
        id: i32,
        viewer: Option<i32>,
    ) -> Result<Option<PostView>, RepoError> {
        let mut stmt = post_view_select(viewer);
        stmt.and_where(Expr::col((PostEntity, post::Column::PostId)).eq(id));

        Ok(self.fetch_views(&stmt).await?.into_iter().next())
    }

    async fn list(
        &self,
        filter: &FeedFilter,
        viewer: Option<i32>,
        page: PageRequest,
    ) -> Result<FeedPage<PostView>, RepoError> {
        if filter.audience == Audience::Followed && viewer.is_none() {
            return Ok(FeedPage::new(Vec::new(), 0, page));
        }

        let condition = feed_condition(filter, viewer);

        let count = Query::select()
            .expr_as(
                Expr::col((PostEntity, post::Column::PostId)).count(),
                Alias::new("total"),
            )
            .from(PostEntity)
            .cond_where(condition.clone())
            .to_owned();
        let backend = self.db.get_database_backend();
        let total = CountRow::find_by_statement(backend.build(&count))
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .map_or(0, |row| row.total.max(0) as u64);

        if page.offset() >= total {
            return Ok(FeedPage::new(Vec::new(), total, page));
        }

        let mut stmt = post_view_select(viewer);
        stmt.cond_where(condition)
            .limit(page.limit)
            .offset(page.offset());
        apply_sort(&mut stmt, filter.sort);
        let posts = self.fetch_views(&stmt).await?;

        tracing::debug!(
            total,
            page = page.page,
            returned = posts.len(),
            "Listed posts"
        );
        Ok(FeedPage::new(posts, total, page))
    }
}

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

#[derive(Debug, FromQueryResult)]
struct ReplyViewRow {
    reply_id: i32,
    post_id: i32,
    replier_id: i32,
    body: String,
    image_url: Option<String>,
    like_count: i32,
    created_at: DateTimeWithTimeZone,
    username: String,
    profile_picture: Option<String>,
    liked: bool,
}

impl From<ReplyViewRow> for ReplyView {
    fn from(row: ReplyViewRow) -> Self {
        Self {
            reply: Reply {
                id: row.reply_id,
                post_id: row.post_id,
                replier_id: row.replier_id,
                body: row.body,
                image_url: row.image_url,
                like_count: row.like_count,
                created_at: row.created_at.into(),
            },
            username: row.username,
            profile_picture: row.profile_picture,
            liked: row.liked,
        }
    }
}

#[async_trait]
impl ReplyRepository for PostgresReplyRepository {
    async fn create(&self, new_reply: NewReply) -> Result<Reply, RepoError> {
        let txn = begin(&self.db).await?;

        let parent = PostEntity::find_by_id(new_reply.post_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(map_db_err)?;
        if parent.is_none() {
            return Err(RepoError::NotFound);
        }

        let model = reply::ActiveModel::from(new_reply)
            .insert(&txn)
            .await
            .map_err(map_db_err)?;

        PostEntity::update_many()
            .col_expr(
                post::Column::ReplyCount,
                Expr::col(post::Column::ReplyCount).add(1),
            )
            .filter(post::Column::PostId.eq(model.post_id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        commit(txn).await?;
        tracing::info!(reply_id = model.reply_id, post_id = model.post_id, "Reply created");
        Ok(model.into())
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let txn = begin(&self.db).await?;

        let Some(existing) = ReplyEntity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(map_db_err)?
        else {
            return Err(RepoError::NotFound);
        };

        ReplyEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        PostEntity::update_many()
            .col_expr(
                post::Column::ReplyCount,
                Expr::col(post::Column::ReplyCount).sub(1),
            )
            .filter(post::Column::PostId.eq(existing.post_id))
            .filter(post::Column::ReplyCount.gt(0))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        commit(txn).await
    }

    async fn list_for_post(
        &self,
        post_id: i32,
        viewer: Option<i32>,
    ) -> Result<Vec<ReplyView>, RepoError> {
        let stmt = Query::select()
            .columns(
                [
                    reply::Column::ReplyId,
                    reply::Column::PostId,
                    reply::Column::ReplierId,
                    reply::Column::Body,
                    reply::Column::ImageUrl,
                    reply::Column::LikeCount,
                    reply::Column::CreatedAt,
                ]
                .map(|column| (ReplyEntity, column)),
            )
            .columns(
                [user::Column::Username, user::Column::ProfilePicture].map(|c| (UserEntity, c)),
            )
            .expr_as(
                liked_expr(
                    viewer,
                    like::Column::ReplyId,
                    (ReplyEntity, reply::Column::ReplyId),
                ),
                Alias::new("liked"),
            )
            .from(ReplyEntity)
            .inner_join(
                UserEntity,
                Expr::col((UserEntity, user::Column::UserId))
                    .equals((ReplyEntity, reply::Column::ReplierId)),
            )
            .and_where(Expr::col((ReplyEntity, reply::Column::PostId)).eq(post_id))
            .order_by((ReplyEntity, reply::Column::CreatedAt), Order::Asc)
            .order_by((ReplyEntity, reply::Column::ReplyId), Order::Asc)
            .to_owned();

        let backend = self.db.get_database_backend();
        let rows = ReplyViewRow::find_by_statement(backend.build(&stmt))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

// ---------------------------------------------------------------------------
// Likes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum Step {
    Up,
    Down,
}

/// Lock the liked row for the rest of the transaction. `false` if it is gone.
async fn lock_target(txn: &DatabaseTransaction, target: LikeTarget) -> Result<bool, RepoError> {
    let found = match target {
        LikeTarget::Post(id) => PostEntity::find_by_id(id)
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(map_db_err)?
            .is_some(),
        LikeTarget::Reply(id) => ReplyEntity::find_by_id(id)
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(map_db_err)?
            .is_some(),
    };

    Ok(found)
}

/// Move a target's like counter by one, never below zero.
async fn step_like_count(
    txn: &DatabaseTransaction,
    target: LikeTarget,
    step: Step,
) -> Result<(), RepoError> {
    match target {
        LikeTarget::Post(id) => {
            let update = PostEntity::update_many().filter(post::Column::PostId.eq(id));
            let update = match step {
                Step::Up => update.col_expr(
                    post::Column::LikeCount,
                    Expr::col(post::Column::LikeCount).add(1),
                ),
                Step::Down => update
                    .col_expr(
                        post::Column::LikeCount,
                        Expr::col(post::Column::LikeCount).sub(1),
                    )
                    .filter(post::Column::LikeCount.gt(0)),
            };
            update.exec(txn).await.map_err(map_db_err)?;
        }
        LikeTarget::Reply(id) => {
            let update = ReplyEntity::update_many().filter(reply::Column::ReplyId.eq(id));
            let update = match step {
                Step::Up => update.col_expr(
                    reply::Column::LikeCount,
                    Expr::col(reply::Column::LikeCount).add(1),
                ),
                Step::Down => update
                    .col_expr(
                        reply::Column::LikeCount,
                        Expr::col(reply::Column::LikeCount).sub(1),
                    )
                    .filter(reply::Column::LikeCount.gt(0)),
            };
            update.exec(txn).await.map_err(map_db_err)?;
        }
    }

    Ok(())
}

#[async_trait]
impl LikeRepository for PostgresLikeRepository {
    async fn like(&self, user_id: i32, target: LikeTarget) -> Result<(), RepoError> {
        let txn = begin(&self.db).await?;

        if !lock_target(&txn, target).await? {
            return Err(RepoError::NotFound);
        }

        let existing = LikeEntity::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::target_column(target).eq(target.id()))
            .one(&txn)
            .await
            .map_err(map_db_err)?;
        if existing.is_some() {
            return Err(RepoError::Constraint(format!(
                "{} already liked",
                target.entity_name()
            )));
        }

        like::new_like(user_id, target)
            .insert(&txn)
            .await
            .map_err(map_db_err)?;
        step_like_count(&txn, target, Step::Up).await?;

        commit(txn).await?;
        tracing::debug!(user_id, ?target, "Like added");
        Ok(())
    }

    async fn unlike(&self, user_id: i32, target: LikeTarget) -> Result<(), RepoError> {
        let txn = begin(&self.db).await?;

        if !lock_target(&txn, target).await? {
            return Err(RepoError::NotFound);
        }

        let result = LikeEntity::delete_many()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::target_column(target).eq(target.id()))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        step_like_count(&txn, target, Step::Down).await?;

        commit(txn).await?;
        tracing::debug!(user_id, ?target, "Like removed");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Follows
// ---------------------------------------------------------------------------

#[async_trait]
impl FollowRepository for PostgresFollowRepository {
    async fn follow(&self, follower_id: i32, followee_id: i32) -> Result<(), RepoError> {
        let txn = begin(&self.db).await?;

        if UserEntity::find_by_id(followee_id)
            .one(&txn)
            .await
            .map_err(map_db_err)?
            .is_none()
        {
            return Err(RepoError::NotFound);
        }

        let existing = FollowEntity::find_by_id((follower_id, followee_id))
            .one(&txn)
            .await
            .map_err(map_db_err)?;
        if existing.is_some() {
            return Err(RepoError::Constraint("Already following".to_string()));
        }

        follow::ActiveModel {
            follower_id: Set(follower_id),
            followee_id: Set(followee_id),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(map_db_err)?;

        commit(txn).await
    }

    async fn unfollow(&self, follower_id: i32, followee_id: i32) -> Result<(), RepoError> {
        let result = FollowEntity::delete_many()
            .filter(follow::Column::FollowerId.eq(follower_id))
            .filter(follow::Column::FolloweeId.eq(followee_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn is_following(&self, follower_id: i32, followee_id: i32) -> Result<bool, RepoError> {
        let existing =
            BaseRepository::<Follow, (i32, i32)>::find_by_id(self, (follower_id, followee_id))
                .await?;

        Ok(existing.is_some())
    }
}
