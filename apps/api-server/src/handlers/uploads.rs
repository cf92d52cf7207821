//! Serves stored images.

use actix_web::{HttpResponse, http::header, web};

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /uploads/{filename}
pub async fn serve_upload(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let filename = path.into_inner();
    let bytes = state.images.open(&filename).await?;
    let mime = mime_guess::from_path(&filename).first_or_octet_stream();

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, mime.essence_str()))
        .insert_header((header::CACHE_CONTROL, "public, max-age=86400"))
        .body(bytes))
}
