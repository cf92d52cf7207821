use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};

use playgrade_core::domain::{
    Audience, Category, FeedFilter, LikeTarget, NewReply, PageRequest, SortOrder, User,
};
use playgrade_core::error::RepoError;
use playgrade_core::ports::{
    BaseRepository, FollowRepository, LikeRepository, PostRepository, ReplyRepository,
    UserRepository,
};

use super::entity::{like, post, user};
use super::postgres_repo::{
    PostgresFollowRepository, PostgresLikeRepository, PostgresPostRepository,
    PostgresReplyRepository, PostgresUserRepository,
};

fn now() -> DateTimeWithTimeZone {
    Utc::now().into()
}

fn user_model(id: i32) -> user::Model {
    user::Model {
        user_id: id,
        username: "alice".to_owned(),
        email: "alice@example.com".to_owned(),
        password_hash: "hash".to_owned(),
        is_admin: false,
        profile_picture: None,
        created_at: now(),
    }
}

fn post_model(id: i32) -> post::Model {
    post::Model {
        post_id: id,
        poster_id: 1,
        title: "Best boss fights".to_owned(),
        body: "Discuss.".to_owned(),
        category: post::CategoryCode::Games,
        image_url: None,
        like_count: 0,
        reply_count: 0,
        created_at: now(),
    }
}

fn like_model(user_id: i32, post_id: i32) -> like::Model {
    like::Model {
        like_id: 1,
        user_id,
        post_id: Some(post_id),
        reply_id: None,
        created_at: now(),
    }
}

fn exec(rows_affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }
}

#[tokio::test]
async fn finds_user_by_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_model(7)]])
        .into_connection();
    let repo = PostgresUserRepository::new(db);

    let user: Option<User> = repo.find_by_id(7).await.unwrap();

    let user = user.unwrap();
    assert_eq!(user.id, 7);
    assert_eq!(user.username, "alice");
    assert!(!user.is_admin);
}

#[tokio::test]
async fn username_update_on_missing_user_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec(0)])
        .into_connection();
    let repo = PostgresUserRepository::new(db);

    let result = repo.update_username(42, "bob").await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn like_on_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();
    let repo = PostgresLikeRepository::new(db);

    let result = repo.like(1, LikeTarget::Post(99)).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn second_like_is_a_constraint_violation() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(5)]])
        .append_query_results([vec![like_model(1, 5)]])
        .into_connection();
    let repo = PostgresLikeRepository::new(db);

    let result = repo.like(1, LikeTarget::Post(5)).await;

    assert!(matches!(result, Err(RepoError::Constraint(_))));
}

#[tokio::test]
async fn like_inserts_row_and_bumps_counter() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(5)]])
        .append_query_results([Vec::<like::Model>::new()])
        .append_query_results([vec![like_model(1, 5)]])
        .append_exec_results([exec(1)])
        .into_connection();
    let repo = PostgresLikeRepository::new(db);

    repo.like(1, LikeTarget::Post(5)).await.unwrap();
}

#[tokio::test]
async fn unlike_without_like_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(5)]])
        .append_exec_results([exec(0)])
        .into_connection();
    let repo = PostgresLikeRepository::new(db);

    let result = repo.unlike(1, LikeTarget::Post(5)).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn reply_to_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();
    let repo = PostgresReplyRepository::new(db);

    let reply = NewReply::new(404, 1, "hello".to_owned()).unwrap();
    let result = repo.create(reply).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn follow_of_missing_user_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();
    let repo = PostgresFollowRepository::new(db);

    let result = repo.follow(1, 2).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn guest_followed_feed_is_empty_without_querying() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let repo = PostgresPostRepository::new(db);
    let filter = FeedFilter {
        audience: Audience::Followed,
        ..Default::default()
    };

    let page = repo
        .list(&filter, None, PageRequest::default())
        .await
        .unwrap();

    assert!(page.items.is_empty());
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn list_maps_rows_and_total() {
    let row = BTreeMap::from([
        ("post_id", Value::from(3)),
        ("poster_id", Value::from(1)),
        ("title", Value::from("Soundtracks")),
        ("body", Value::from("Favourite scores?")),
        ("category", Value::from("M")),
        ("image_url", Value::String(None)),
        ("like_count", Value::from(4)),
        ("reply_count", Value::from(2)),
        ("created_at", Value::from(now())),
        ("username", Value::from("alice")),
        ("profile_picture", Value::String(None)),
        ("liked", Value::from(true)),
    ]);
    let count = BTreeMap::from([("total", Value::BigInt(Some(2)))]);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count]])
        .append_query_results([vec![row]])
        .into_connection();
    let repo = PostgresPostRepository::new(db);
    let filter = FeedFilter {
        categories: vec![Category::Music],
        sort: SortOrder::MostLiked,
        ..Default::default()
    };

    let page = repo
        .list(&filter, Some(1), PageRequest::new(Some(1), Some(1)).unwrap())
        .await
        .unwrap();

    assert_eq!(page.total, 2);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items.len(), 1);
    let view = &page.items[0];
    assert_eq!(view.post.category, Category::Music);
    assert_eq!(view.post.like_count, 4);
    assert_eq!(view.username, "alice");
    assert!(view.liked);
}

#[tokio::test]
async fn page_past_the_end_skips_the_row_query() {
    let count = BTreeMap::from([("total", Value::BigInt(Some(3)))]);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count]])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    let request = PageRequest::new(Some(i64::MAX / 100), Some(100)).unwrap();
    let page = repo
        .list(&FeedFilter::default(), None, request)
        .await
        .unwrap();

    assert!(page.items.is_empty());
    assert_eq!(page.total, 3);
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.page, request.page);
}
