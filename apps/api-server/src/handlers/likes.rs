//! Like and unlike posts or replies.

use actix_web::{HttpResponse, web};

use playgrade_core::RepoError;
use playgrade_core::domain::LikeTarget;
use playgrade_shared::dto::{LikeRequest, MessageResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn target(req: &LikeRequest) -> AppResult<LikeTarget> {
    match (req.target_type.as_deref(), req.target_id) {
        (Some(kind), Some(id)) => Ok(LikeTarget::parse(kind.trim(), id)?),
        _ => Err(AppError::bad_request("Invalid input")),
    }
}

/// POST /likes
pub async fn like(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<LikeRequest>,
) -> AppResult<HttpResponse> {
    let target = target(&body)?;

    state
        .likes
        .like(identity.user_id, target)
        .await
        .map_err(|e| match e {
            RepoError::NotFound => {
                AppError::not_found(format!("{} not found", target.entity_name()))
            }
            RepoError::Constraint(_) => AppError::bad_request("Like already exists"),
            other => other.into(),
        })?;

    Ok(HttpResponse::Created().json(MessageResponse::new("Like added successfully")))
}

/// DELETE /likes
pub async fn unlike(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<LikeRequest>,
) -> AppResult<HttpResponse> {
    let target = target(&body)?;

    state
        .likes
        .unlike(identity.user_id, target)
        .await
        .map_err(|e| match e {
            RepoError::NotFound => AppError::bad_request("Like does not exist"),
            other => other.into(),
        })?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Like removed successfully")))
}
