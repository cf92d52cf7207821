//! Reply handlers.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};

use playgrade_core::{DomainError, RepoError};
use playgrade_core::domain::NewReply;
use playgrade_shared::dto::{CreateReplyResponse, MessageResponse};

use super::form::{UploadForm, store_image};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /replies
pub async fn create_reply(
    state: web::Data<AppState>,
    identity: Identity,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let mut form = UploadForm::read(payload, state.max_upload_bytes).await?;

    let (Some(post_id), Some(body)) = (form.text("post_id"), form.text("body")) else {
        return Err(AppError::bad_request("Post ID and body are required"));
    };
    let post_id: i32 = post_id
        .parse()
        .map_err(|_| AppError::bad_request("Invalid post ID"))?;
    let new_reply = NewReply::new(post_id, identity.user_id, body.to_string())?;

    // Older clients send the file as `image_url`.
    let file = form
        .take_file("image")
        .or_else(|| form.take_file("image_url"));

    let image_url = match &file {
        Some(file) => Some(store_image(&state, file).await?),
        None => None,
    };

    let reply = match state
        .replies
        .create(new_reply.with_image(image_url.clone()))
        .await
    {
        Ok(reply) => reply,
        Err(e) => {
            state.discard_images(image_url).await;
            return Err(match e {
                RepoError::NotFound => AppError::not_found("Post not found"),
                other => other.into(),
            });
        }
    };

    tracing::info!(reply_id = reply.id, post_id = reply.post_id, "Reply created");

    Ok(HttpResponse::Created().json(CreateReplyResponse {
        message: "Reply created successfully".to_string(),
        reply_id: reply.id,
    }))
}

/// DELETE /replies/{id}
pub async fn delete_reply(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let reply_id = path.into_inner();
    let reply = state
        .replies
        .find_by_id(reply_id)
        .await?
        .ok_or(DomainError::NotFound {
            entity_type: "Reply",
            id: reply_id,
        })?;
    identity.actor().authorize(reply.replier_id)?;

    state.replies.delete(reply.id).await?;
    state.discard_images(reply.image_url).await;

    tracing::info!(reply_id = reply.id, deleted_by = identity.user_id, "Reply deleted");

    Ok(HttpResponse::Ok().json(MessageResponse::new("Reply deleted successfully")))
}
