//! Account handlers: registration, login, profile and account management.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};

use playgrade_core::DomainError;
use playgrade_core::domain::{
    NewUser, User, validate_email, validate_password, validate_username,
};
use playgrade_core::ports::AuthError;
use playgrade_shared::dto::{
    LoginRequest, LoginResponse, MessageResponse, ProfilePictureResponse, RegisterResponse,
    RegisterUserRequest, UpdatePasswordRequest, UpdateUsernameRequest, UserResponse,
};

use super::form::{UploadForm, store_image};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

async fn load_user(state: &AppState, id: i32) -> AppResult<User> {
    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound {
            entity_type: "User",
            id,
        })?;
    Ok(user)
}

/// POST /users/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let username = req.username.trim();
    let email = req.email.trim();

    if username.is_empty() || email.is_empty() || req.password.is_empty() {
        return Err(AppError::bad_request("All fields are required"));
    }
    validate_username(username)?;
    validate_email(email)?;
    validate_password(&req.password)?;

    if state.users.find_by_username(username).await?.is_some() {
        return Err(DomainError::Duplicate("Username already exists".to_string()).into());
    }
    if state.users.find_by_email(email).await?.is_some() {
        return Err(DomainError::Duplicate("Email already exists".to_string()).into());
    }

    let password_hash = state.passwords.hash(&req.password)?;

    let user = state
        .users
        .create(NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
        })
        .await?;

    tracing::info!(user_id = user.id, "User registered");

    Ok(HttpResponse::Created().json(RegisterResponse {
        message: "User registered successfully".to_string(),
        user_id: user.id,
    }))
}

/// POST /users/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let email = req.email.trim();

    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::bad_request("Email and password are required"));
    }

    let user = state
        .users
        .find_by_email(email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !state.passwords.verify(&req.password, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state.tokens.generate_token(user.id, user.is_admin)?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.expiration_seconds().max(0) as u64,
    }))
}

/// GET /users/{id}
pub async fn get_user(state: web::Data<AppState>, path: web::Path<i32>) -> AppResult<HttpResponse> {
    let user = load_user(&state, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(UserResponse {
        user_id: user.id,
        username: user.username,
        profile_picture: user.profile_picture,
    }))
}

/// DELETE /users/{id}
pub async fn delete_user(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let user = load_user(&state, path.into_inner()).await?;
    identity.actor().authorize(user.id)?;

    let images = state.users.image_urls(user.id).await?;
    state.users.delete(user.id).await?;
    state.discard_images(images).await;

    tracing::info!(user_id = user.id, deleted_by = identity.user_id, "User deleted");

    Ok(HttpResponse::Ok().json(MessageResponse::new("User deleted successfully")))
}

/// PATCH /users/{id}/username
pub async fn update_username(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i32>,
    body: web::Json<UpdateUsernameRequest>,
) -> AppResult<HttpResponse> {
    let user = load_user(&state, path.into_inner()).await?;
    identity.actor().authorize(user.id)?;

    let username = body.username.trim();
    validate_username(username)?;

    if let Some(other) = state.users.find_by_username(username).await? {
        if other.id != user.id {
            return Err(DomainError::Duplicate("Username already exists".to_string()).into());
        }
    }

    state.users.update_username(user.id, username).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Username updated successfully")))
}

/// PATCH /users/{id}/password
///
/// Changing one's own password requires the current one. An admin resetting
/// another account's password does not.
pub async fn update_password(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i32>,
    body: web::Json<UpdatePasswordRequest>,
) -> AppResult<HttpResponse> {
    let user = load_user(&state, path.into_inner()).await?;
    identity.actor().authorize(user.id)?;

    let req = body.into_inner();
    validate_password(&req.new_password)?;

    if identity.user_id == user.id {
        let current = req
            .current_password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::bad_request("Current password is required"))?;

        if !state.passwords.verify(current, &user.password_hash)? {
            return Err(AppError::bad_request("Current password is incorrect"));
        }
    }

    let password_hash = state.passwords.hash(&req.new_password)?;
    state
        .users
        .update_password_hash(user.id, &password_hash)
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Password updated successfully")))
}

/// PATCH /users/{id}/profile-picture
pub async fn update_profile_picture(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i32>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let user = load_user(&state, path.into_inner()).await?;
    identity.actor().authorize(user.id)?;

    let mut form = UploadForm::read(payload, state.max_upload_bytes).await?;
    let file = form
        .take_file("image")
        .ok_or_else(|| AppError::bad_request("No image uploaded"))?;

    let url = store_image(&state, &file).await?;

    let updated = state
        .users
        .update_profile_picture(user.id, Some(&url))
        .await;
    if let Err(e) = updated {
        state.discard_images([url]).await;
        return Err(e.into());
    }

    if let Some(previous) = user.profile_picture {
        state.discard_images([previous]).await;
    }

    Ok(HttpResponse::Ok().json(ProfilePictureResponse {
        message: "Profile picture updated successfully".to_string(),
        profile_picture: url,
    }))
}
