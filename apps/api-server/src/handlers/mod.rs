//! HTTP handlers and route configuration.

mod follows;
mod form;
mod health;
mod likes;
mod posts;
mod replies;
mod uploads;
mod users;

use actix_web::{error, web};

use crate::middleware::error::AppError;

/// Malformed JSON bodies, query strings and path segments become 400 problems.
fn extractor_configs(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        error::Error::from(AppError::bad_request(err.to_string()))
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        error::Error::from(AppError::bad_request(err.to_string()))
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        error::Error::from(AppError::bad_request(err.to_string()))
    }));
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    extractor_configs(cfg);

    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/users")
                .route("/register", web::post().to(users::register))
                .route("/login", web::post().to(users::login))
                .route("/{id}", web::get().to(users::get_user))
                .route("/{id}", web::delete().to(users::delete_user))
                .route("/{id}/username", web::patch().to(users::update_username))
                .route("/{id}/password", web::patch().to(users::update_password))
                .route(
                    "/{id}/profile-picture",
                    web::patch().to(users::update_profile_picture),
                ),
        )
        .service(
            web::scope("/posts")
                .route("", web::post().to(posts::create_post))
                .route("", web::get().to(posts::list_posts))
                .route("/{id}", web::get().to(posts::get_post))
                .route("/{id}", web::delete().to(posts::delete_post)),
        )
        .service(
            web::scope("/replies")
                .route("", web::post().to(replies::create_reply))
                .route("/{id}", web::delete().to(replies::delete_reply)),
        )
        .service(
            web::resource("/likes")
                .route(web::post().to(likes::like))
                .route(web::delete().to(likes::unlike)),
        )
        .service(
            web::scope("/follows")
                .route("", web::post().to(follows::follow))
                .route("", web::delete().to(follows::unfollow))
                .route("/status/{id}", web::get().to(follows::follow_status)),
        )
        .route("/uploads/{filename}", web::get().to(uploads::serve_upload));
}
