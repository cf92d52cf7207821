//! End-to-end tests of the router over the in-memory repositories.

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::{Value, json};
use tempfile::TempDir;

use api_server::handlers::configure_routes;
use api_server::observability::RequestIdMiddleware;
use api_server::state::{AppState, Repositories};
use playgrade_core::domain::{Category, LikeTarget, NewPost, NewReply, NewUser};
use playgrade_infra::{Argon2PasswordService, JwtConfig, JwtTokenService, LocalImageStore};

const MAX_UPLOAD_BYTES: usize = 64 * 1024;
const BOUNDARY: &str = "playgrade-test-boundary";
const PNG: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-a-png";

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .wrap(RequestIdMiddleware)
                .configure(configure_routes),
        )
        .await
    };
}

async fn test_state() -> (AppState, TempDir) {
    let uploads = tempfile::tempdir().unwrap();
    let images = LocalImageStore::new(uploads.path()).await.unwrap();
    let tokens = JwtTokenService::new(JwtConfig {
        secret: "test-secret".to_string(),
        expiration_hours: 1,
        issuer: "playgrade-test".to_string(),
    });

    let state = AppState::new(
        Repositories::in_memory(),
        Arc::new(images),
        Arc::new(tokens),
        Arc::new(Argon2PasswordService::new()),
        MAX_UPLOAD_BYTES,
    );
    (state, uploads)
}

async fn send<S, B>(app: &S, req: test::TestRequest) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

/// Insert a user directly and return its id with a bearer header value.
async fn seed_user(state: &AppState, username: &str) -> (i32, String) {
    let user = state
        .users
        .create(NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "unused".to_string(),
        })
        .await
        .unwrap();
    let token = state.tokens.generate_token(user.id, false).unwrap();
    (user.id, format!("Bearer {token}"))
}

fn stored_files(uploads: &TempDir) -> usize {
    std::fs::read_dir(uploads.path()).unwrap().count()
}

async fn seed_post(state: &AppState, poster_id: i32, title: &str, category: Category) -> i32 {
    let post = NewPost::new(poster_id, title.to_string(), "body".to_string(), category)
        .unwrap()
        .with_image("/uploads/seeded.png");
    state.posts.create(post).await.unwrap().id
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

fn multipart(req: test::TestRequest, parts: &[Part<'_>]) -> test::TestRequest {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                        .as_bytes(),
                );
            }
            Part::File(name, filename, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    req.insert_header((
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
    ))
    .set_payload(body)
}

#[actix_rt::test]
async fn register_and_login_issue_a_token_for_the_user() {
    let (state, _uploads) = test_state().await;
    let app = app!(state);

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/users/register")
            .set_json(json!({"username": "mario", "email": "mario@example.com", "password": "itsame123"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let user_id = body["user_id"].as_i64().unwrap() as i32;

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/users/login")
            .set_json(json!({"email": "mario@example.com", "password": "itsame123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");

    let claims = state
        .tokens
        .validate_token(body["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.user_id, user_id);
    assert!(!claims.is_admin);

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/users/login")
            .set_json(json!({"email": "mario@example.com", "password": "wrong-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid email or password");
}

#[actix_rt::test]
async fn duplicate_registration_is_rejected_without_insert() {
    let (state, _uploads) = test_state().await;
    let app = app!(state);
    seed_user(&state, "luigi").await;

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/users/register")
            .set_json(json!({"username": "luigi", "email": "other@example.com", "password": "password1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Username already exists");

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/users/register")
            .set_json(json!({"username": "peach", "email": "luigi@example.com", "password": "password1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Email already exists");
    assert!(state.users.find_by_username("peach").await.unwrap().is_none());

    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/users/register")
            .set_json(json!({"username": "toad", "email": "toad@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn missing_or_invalid_tokens_are_unauthorized() {
    let (state, _uploads) = test_state().await;
    let app = app!(state);
    let like = json!({"target_id": 1, "type": "post"});

    let (status, _) = send(
        &app,
        test::TestRequest::post().uri("/likes").set_json(&like),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/likes")
            .insert_header((header::AUTHORIZATION, "Bearer not-a-jwt"))
            .set_json(&like),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Optional auth still rejects a forged token.
    let (status, _) = send(
        &app,
        test::TestRequest::get()
            .uri("/posts")
            .insert_header((header::AUTHORIZATION, "Bearer not-a-jwt")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn liking_twice_and_unliking_nothing_are_rejected() {
    let (state, _uploads) = test_state().await;
    let app = app!(state);
    let (author, _) = seed_user(&state, "link").await;
    let (_, fan) = seed_user(&state, "zelda").await;
    let post_id = seed_post(&state, author, "Hyrule", Category::Games).await;
    let like = json!({"target_id": post_id, "type": "post"});

    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/likes")
            .insert_header((header::AUTHORIZATION, fan.as_str()))
            .set_json(&like),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/likes")
            .insert_header((header::AUTHORIZATION, fan.as_str()))
            .set_json(&like),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Like already exists");

    let (status, body) = send(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{post_id}"))
            .insert_header((header::AUTHORIZATION, fan.as_str())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["post"]["like_count"], 1);
    assert_eq!(body["post"]["liked"], true);
    assert_eq!(body["post"]["category"], "G");

    let (status, _) = send(
        &app,
        test::TestRequest::delete()
            .uri("/likes")
            .insert_header((header::AUTHORIZATION, fan.as_str()))
            .set_json(&like),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        test::TestRequest::delete()
            .uri("/likes")
            .insert_header((header::AUTHORIZATION, fan.as_str()))
            .set_json(&like),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Like does not exist");

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/likes")
            .insert_header((header::AUTHORIZATION, fan.as_str()))
            .set_json(json!({"target_id": 4242, "type": "reply"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Reply not found");

    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/likes")
            .insert_header((header::AUTHORIZATION, fan.as_str()))
            .set_json(json!({"target_id": post_id, "type": "comment"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn reply_lifecycle_keeps_counter_and_enforces_ownership() {
    let (state, _uploads) = test_state().await;
    let app = app!(state);
    let (author, author_auth) = seed_user(&state, "samus").await;
    let (_, replier_auth) = seed_user(&state, "ridley").await;
    let post_id = seed_post(&state, author, "Metroid", Category::Games).await;

    let (status, body) = send(
        &app,
        multipart(
            test::TestRequest::post()
                .uri("/replies")
                .insert_header((header::AUTHORIZATION, replier_auth.as_str())),
            &[
                Part::Text("post_id", &post_id.to_string()),
                Part::Text("body", "Great game"),
                Part::File("image_url", "shot.JPG", PNG),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let reply_id = body["reply_id"].as_i64().unwrap();

    let (_, body) = send(&app, test::TestRequest::get().uri(&format!("/posts/{post_id}"))).await;
    assert_eq!(body["post"]["reply_count"], 1);
    assert_eq!(body["post"]["liked"], false);
    let image_url = body["replies"][0]["image_url"].as_str().unwrap().to_string();
    assert!(image_url.starts_with("/uploads/") && image_url.ends_with(".jpg"));

    let (status, _) = send(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/replies/{reply_id}"))
            .insert_header((header::AUTHORIZATION, author_auth.as_str())),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/replies/{reply_id}"))
            .insert_header((header::AUTHORIZATION, replier_auth.as_str())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, test::TestRequest::get().uri(&format!("/posts/{post_id}"))).await;
    assert_eq!(body["post"]["reply_count"], 0);
    assert_eq!(body["replies"], json!([]));

    let (status, _) = send(&app, test::TestRequest::get().uri(&image_url)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        multipart(
            test::TestRequest::post()
                .uri("/replies")
                .insert_header((header::AUTHORIZATION, replier_auth.as_str())),
            &[Part::Text("post_id", "9999"), Part::Text("body", "hello?")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Post not found");
}

#[actix_rt::test]
async fn only_owner_or_admin_may_delete_a_post() {
    let (state, _uploads) = test_state().await;
    let app = app!(state);
    let (author, _) = seed_user(&state, "kirby").await;
    let (_, stranger) = seed_user(&state, "dedede").await;
    let post_id = seed_post(&state, author, "Dream Land", Category::Games).await;

    let (status, body) = send(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/posts/{post_id}"))
            .insert_header((header::AUTHORIZATION, stranger.as_str())),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["status"], 403);

    let admin = state.tokens.generate_token(9999, true).unwrap();
    let (status, _) = send(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/posts/{post_id}"))
            .insert_header((header::AUTHORIZATION, format!("Bearer {admin}"))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, test::TestRequest::get().uri(&format!("/posts/{post_id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn feed_pagination_and_filters() {
    let (state, _uploads) = test_state().await;
    let app = app!(state);
    let (author, _) = seed_user(&state, "cloud").await;
    seed_post(&state, author, "Midgar", Category::Games).await;
    seed_post(&state, author, "Advent Children", Category::FilmTv).await;
    seed_post(&state, author, "One Winged Angel", Category::Music).await;

    let (status, body) = send(&app, test::TestRequest::get().uri("/posts?limit=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalPosts"], 3);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["currentPage"], 1);
    assert_eq!(body["posts"].as_array().unwrap().len(), 2);
    assert_eq!(body["posts"][0]["title"], "One Winged Angel");

    let (status, body) = send(&app, test::TestRequest::get().uri("/posts?limit=2&page=5")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["posts"], json!([]));
    assert_eq!(body["totalPosts"], 3);

    let (_, body) = send(
        &app,
        test::TestRequest::get().uri("/posts?categories=Music,F&searchQuery=CHILD"),
    )
    .await;
    assert_eq!(body["totalPosts"], 1);
    assert_eq!(body["posts"][0]["title"], "Advent Children");

    for bad in [
        "/posts?limit=0",
        "/posts?page=0",
        "/posts?categories=Books",
        "/posts?ageRange=Decade",
        "/posts?page=abc",
        "/posts?page=9223372036854775807&limit=100",
    ] {
        let (status, _) = send(&app, test::TestRequest::get().uri(bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{bad}");
    }
}

#[actix_rt::test]
async fn followed_feed_shows_followees_only() {
    let (state, _uploads) = test_state().await;
    let app = app!(state);
    let (_, reader) = seed_user(&state, "ness").await;
    let (followee, _) = seed_user(&state, "lucas").await;
    let (other, _) = seed_user(&state, "ninten").await;
    seed_post(&state, followee, "Mother 3", Category::Games).await;
    seed_post(&state, other, "Mother", Category::Games).await;

    let followed = "/posts?users=Followed%20Posts";
    let (status, body) = send(&app, test::TestRequest::get().uri(followed)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["posts"], json!([]));
    assert_eq!(body["totalPosts"], 0);

    let follow = json!({"followee_id": followee});
    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/follows")
            .insert_header((header::AUTHORIZATION, reader.as_str()))
            .set_json(&follow),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/follows")
            .insert_header((header::AUTHORIZATION, reader.as_str()))
            .set_json(&follow),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Already following this user");

    let (_, body) = send(
        &app,
        test::TestRequest::get()
            .uri(&format!("/follows/status/{followee}"))
            .insert_header((header::AUTHORIZATION, reader.as_str())),
    )
    .await;
    assert_eq!(body["is_following"], true);

    let (_, body) = send(
        &app,
        test::TestRequest::get()
            .uri(followed)
            .insert_header((header::AUTHORIZATION, reader.as_str())),
    )
    .await;
    assert_eq!(body["totalPosts"], 1);
    assert_eq!(body["posts"][0]["title"], "Mother 3");

    let (status, _) = send(
        &app,
        test::TestRequest::delete()
            .uri("/follows")
            .insert_header((header::AUTHORIZATION, reader.as_str()))
            .set_json(&follow),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        test::TestRequest::delete()
            .uri("/follows")
            .insert_header((header::AUTHORIZATION, reader.as_str()))
            .set_json(&follow),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Not following this user");
}

#[actix_rt::test]
async fn uploaded_post_image_is_served_with_its_content_type() {
    let (state, _uploads) = test_state().await;
    let app = app!(state);
    let (_, auth) = seed_user(&state, "fox").await;

    let (status, body) = send(
        &app,
        multipart(
            test::TestRequest::post()
                .uri("/posts")
                .insert_header((header::AUTHORIZATION, auth.as_str())),
            &[
                Part::Text("title", "Star Fox"),
                Part::Text("body", "Do a barrel roll"),
                Part::Text("category", "🎮 Games"),
                Part::File("image", "arwing.png", PNG),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let post_id = body["post_id"].as_i64().unwrap();

    let (_, body) = send(&app, test::TestRequest::get().uri(&format!("/posts/{post_id}"))).await;
    let image_url = body["post"]["image_url"].as_str().unwrap().to_string();
    assert_ne!(image_url, "/uploads/arwing.png");

    let resp = test::call_service(&app, test::TestRequest::get().uri(&image_url).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/png");
    assert_eq!(test::read_body(resp).await.as_ref(), PNG);

    let (status, _) = send(
        &app,
        multipart(
            test::TestRequest::post()
                .uri("/posts")
                .insert_header((header::AUTHORIZATION, auth.as_str())),
            &[
                Part::Text("title", "Payload"),
                Part::Text("body", "shell script"),
                Part::Text("category", "Games"),
                Part::File("image", "run.sh", b"#!/bin/sh"),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, test::TestRequest::get().uri("/uploads/missing.png")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn oversized_upload_is_rejected() {
    let (state, _uploads) = test_state().await;
    let app = app!(state);
    let (user_id, auth) = seed_user(&state, "bowser").await;
    let huge = vec![0u8; MAX_UPLOAD_BYTES + 1];

    let (status, body) = send(
        &app,
        multipart(
            test::TestRequest::patch()
                .uri(&format!("/users/{user_id}/profile-picture"))
                .insert_header((header::AUTHORIZATION, auth.as_str())),
            &[Part::File("image", "castle.png", &huge)],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["status"], 413);
}

#[actix_rt::test]
async fn error_body_carries_the_request_id() {
    let (state, _uploads) = test_state().await;
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/users/404")
            .insert_header(("X-Request-ID", "req-abc"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "req-abc");

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "User not found");
    assert_eq!(body["request_id"], "req-abc");
}

#[actix_rt::test]
async fn password_change_requires_current_password_for_self() {
    let (state, _uploads) = test_state().await;
    let app = app!(state);

    let (_, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/users/register")
            .set_json(json!({"username": "yoshi", "email": "yoshi@example.com", "password": "egg-layer"})),
    )
    .await;
    let user_id = body["user_id"].as_i64().unwrap();
    let auth = format!(
        "Bearer {}",
        state.tokens.generate_token(user_id as i32, false).unwrap()
    );
    let uri = format!("/users/{user_id}/password");

    let (status, body) = send(
        &app,
        test::TestRequest::patch()
            .uri(&uri)
            .insert_header((header::AUTHORIZATION, auth.as_str()))
            .set_json(json!({"new_password": "tongue-lash"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Current password is required");

    let (status, _) = send(
        &app,
        test::TestRequest::patch()
            .uri(&uri)
            .insert_header((header::AUTHORIZATION, auth.as_str()))
            .set_json(json!({"new_password": "tongue-lash", "current_password": "wrong-one"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        test::TestRequest::patch()
            .uri(&uri)
            .insert_header((header::AUTHORIZATION, auth.as_str()))
            .set_json(json!({"new_password": "tongue-lash", "current_password": "egg-layer"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/users/login")
            .set_json(json!({"email": "yoshi@example.com", "password": "tongue-lash"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_rt::test]
async fn deleting_a_user_corrects_counters_on_others_posts() {
    let (state, _uploads) = test_state().await;
    let app = app!(state);
    let (author, _) = seed_user(&state, "wario").await;
    let (visitor, visitor_auth) = seed_user(&state, "waluigi").await;
    let post_id = seed_post(&state, author, "Ware", Category::Games).await;

    state
        .likes
        .like(visitor, LikeTarget::Post(post_id))
        .await
        .unwrap();
    state
        .replies
        .create(NewReply::new(post_id, visitor, "wah".to_string()).unwrap())
        .await
        .unwrap();

    let (status, _) = send(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/users/{visitor}"))
            .insert_header((header::AUTHORIZATION, visitor_auth.as_str())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, test::TestRequest::get().uri(&format!("/posts/{post_id}"))).await;
    assert_eq!(body["post"]["like_count"], 0);
    assert_eq!(body["post"]["reply_count"], 0);

    let (status, _) = send(&app, test::TestRequest::get().uri(&format!("/users/{visitor}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn strangers_cannot_manage_another_account_but_admins_can() {
    let (state, _uploads) = test_state().await;
    let app = app!(state);
    let (owner, _) = seed_user(&state, "pikachu").await;
    let (_, stranger) = seed_user(&state, "meowth").await;
    let admin = format!("Bearer {}", state.tokens.generate_token(9999, true).unwrap());

    let attempts = [
        test::TestRequest::delete().uri(&format!("/users/{owner}")),
        test::TestRequest::patch()
            .uri(&format!("/users/{owner}/username"))
            .set_json(json!({"username": "team-rocket"})),
        test::TestRequest::patch()
            .uri(&format!("/users/{owner}/password"))
            .set_json(json!({"new_password": "prepare-for-trouble"})),
        multipart(
            test::TestRequest::patch().uri(&format!("/users/{owner}/profile-picture")),
            &[Part::File("image", "balloon.png", PNG)],
        ),
    ];
    for req in attempts {
        let (status, body) = send(
            &app,
            req.insert_header((header::AUTHORIZATION, stranger.as_str())),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["status"], 403);
    }

    let (_, body) = send(&app, test::TestRequest::get().uri(&format!("/users/{owner}"))).await;
    assert_eq!(body["username"], "pikachu");
    assert_eq!(body["profile_picture"], Value::Null);

    let (status, _) = send(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/users/{owner}/username"))
            .insert_header((header::AUTHORIZATION, admin.as_str()))
            .set_json(json!({"username": "raichu"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // An admin reset needs no current password.
    let (status, _) = send(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/users/{owner}/password"))
            .insert_header((header::AUTHORIZATION, admin.as_str()))
            .set_json(json!({"new_password": "thunderbolt"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, test::TestRequest::get().uri(&format!("/users/{owner}"))).await;
    assert_eq!(body["username"], "raichu");

    let (status, _) = send(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/users/{owner}"))
            .insert_header((header::AUTHORIZATION, admin.as_str())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, test::TestRequest::get().uri(&format!("/users/{owner}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn deleting_a_post_leaves_other_posts_untouched() {
    let (state, _uploads) = test_state().await;
    let app = app!(state);
    let (author, author_auth) = seed_user(&state, "sonic").await;
    let (rival, _) = seed_user(&state, "shadow").await;
    let (fan, _) = seed_user(&state, "tails").await;
    let doomed = seed_post(&state, author, "Green Hill", Category::Games).await;
    let kept = seed_post(&state, rival, "Space Colony", Category::Games).await;

    for post_id in [doomed, kept] {
        state.likes.like(fan, LikeTarget::Post(post_id)).await.unwrap();
        let reply = state
            .replies
            .create(NewReply::new(post_id, fan, "fast".to_string()).unwrap())
            .await
            .unwrap();
        state.likes.like(author, LikeTarget::Reply(reply.id)).await.unwrap();
    }

    let (status, _) = send(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/posts/{doomed}"))
            .insert_header((header::AUTHORIZATION, author_auth.as_str())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, test::TestRequest::get().uri(&format!("/posts/{kept}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["post"]["like_count"], 1);
    assert_eq!(body["post"]["reply_count"], 1);
    let replies = body["replies"].as_array().unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["body"], "fast");
    assert_eq!(replies[0]["like_count"], 1);
}

#[actix_rt::test]
async fn deleting_a_user_removes_reply_images_left_on_their_posts() {
    let (state, uploads) = test_state().await;
    let app = app!(state);
    let (author, author_auth) = seed_user(&state, "ganon").await;
    let (_, visitor_auth) = seed_user(&state, "impa").await;
    let post_id = seed_post(&state, author, "Twilight", Category::Games).await;

    let (status, _) = send(
        &app,
        multipart(
            test::TestRequest::post()
                .uri("/replies")
                .insert_header((header::AUTHORIZATION, visitor_auth.as_str())),
            &[
                Part::Text("post_id", &post_id.to_string()),
                Part::Text("body", "Look at this"),
                Part::File("image", "sheikah.png", PNG),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(stored_files(&uploads), 1);

    let (status, _) = send(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/users/{author}"))
            .insert_header((header::AUTHORIZATION, author_auth.as_str())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored_files(&uploads), 0);
}
