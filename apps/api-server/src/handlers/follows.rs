//! Follow relationships.

use actix_web::{HttpResponse, web};

use playgrade_core::RepoError;
use playgrade_core::domain::validate_follow;
use playgrade_shared::dto::{FollowRequest, FollowStatusResponse, MessageResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn followee(req: &FollowRequest) -> AppResult<i32> {
    req.followee_id
        .ok_or_else(|| AppError::bad_request("followee_id is required"))
}

/// POST /follows
pub async fn follow(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<FollowRequest>,
) -> AppResult<HttpResponse> {
    let followee_id = followee(&body)?;
    validate_follow(identity.user_id, followee_id)?;

    state
        .follows
        .follow(identity.user_id, followee_id)
        .await
        .map_err(|e| match e {
            RepoError::NotFound => AppError::not_found("User not found"),
            RepoError::Constraint(_) => AppError::bad_request("Already following this user"),
            other => other.into(),
        })?;

    Ok(HttpResponse::Created().json(MessageResponse::new("Followed successfully")))
}

/// DELETE /follows
pub async fn unfollow(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<FollowRequest>,
) -> AppResult<HttpResponse> {
    let followee_id = followee(&body)?;

    state
        .follows
        .unfollow(identity.user_id, followee_id)
        .await
        .map_err(|e| match e {
            RepoError::NotFound => AppError::bad_request("Not following this user"),
            other => other.into(),
        })?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Unfollowed successfully")))
}

/// GET /follows/status/{id}
pub async fn follow_status(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let is_following = state
        .follows
        .is_following(identity.user_id, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(FollowStatusResponse { is_following }))
}
