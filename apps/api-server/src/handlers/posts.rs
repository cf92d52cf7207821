//! Post handlers: creation, deletion, detail and the filtered feed.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};

use playgrade_core::DomainError;
use playgrade_core::domain::{
    AgeRange, Audience, Category, FeedFilter, NewPost, PageRequest, PostView, ReplyView, SortOrder,
};
use playgrade_shared::dto::{
    CreatePostResponse, MessageResponse, PostDetailResponse, PostListQuery, PostListResponse,
    PostResponse, ReplyResponse,
};

use super::form::{UploadForm, store_image};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn post_response(view: PostView) -> PostResponse {
    let PostView {
        post,
        username,
        profile_picture,
        liked,
    } = view;

    PostResponse {
        post_id: post.id,
        poster_id: post.poster_id,
        title: post.title,
        category: post.category.code().to_string(),
        body: post.body,
        image_url: post.image_url,
        like_count: post.like_count,
        reply_count: post.reply_count,
        created_at: post.created_at.to_rfc3339(),
        username,
        profile_picture,
        liked,
    }
}

fn reply_response(view: ReplyView) -> ReplyResponse {
    let ReplyView {
        reply,
        username,
        profile_picture,
        liked,
    } = view;

    ReplyResponse {
        reply_id: reply.id,
        post_id: reply.post_id,
        replier_id: reply.replier_id,
        body: reply.body,
        image_url: reply.image_url,
        like_count: reply.like_count,
        created_at: reply.created_at.to_rfc3339(),
        username,
        profile_picture,
        liked,
    }
}

/// POST /posts
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let mut form = UploadForm::read(payload, state.max_upload_bytes).await?;

    let (Some(title), Some(body), Some(category)) =
        (form.text("title"), form.text("body"), form.text("category"))
    else {
        return Err(AppError::bad_request(
            "Title, body, and category are required",
        ));
    };

    let category: Category = category.parse()?;
    let new_post = NewPost::new(
        identity.user_id,
        title.to_string(),
        body.to_string(),
        category,
    )?;

    let file = form
        .take_file("image")
        .ok_or_else(|| AppError::bad_request("Image is required"))?;
    let image_url = store_image(&state, &file).await?;

    let post = match state.posts.create(new_post.with_image(image_url.clone())).await {
        Ok(post) => post,
        Err(e) => {
            state.discard_images([image_url]).await;
            return Err(e.into());
        }
    };

    tracing::info!(post_id = post.id, poster_id = post.poster_id, "Post created");

    Ok(HttpResponse::Created().json(CreatePostResponse {
        message: "Post created successfully".to_string(),
        post_id: post.id,
    }))
}

/// GET /posts
pub async fn list_posts(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    query: web::Query<PostListQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();

    let filter = FeedFilter {
        categories: FeedFilter::parse_categories(query.categories.as_deref())?,
        audience: Audience::parse(query.users.as_deref())?,
        age: AgeRange::parse(query.age_range.as_deref())?,
        search: query.search_query,
        poster_id: query.poster_id,
        sort: SortOrder::lookup(query.sort_by.as_deref()),
    };
    let page = PageRequest::new(query.page, query.limit)?;

    let result = state.posts.list(&filter, viewer.user_id(), page).await?;

    Ok(HttpResponse::Ok().json(PostListResponse {
        posts: result.items.into_iter().map(post_response).collect(),
        total_pages: result.total_pages,
        current_page: result.page,
        total_posts: result.total,
    }))
}

/// GET /posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    let post = state
        .posts
        .find_view(post_id, viewer.user_id())
        .await?
        .ok_or_else(|| AppError::not_found("Post not found"))?;

    let replies = state
        .replies
        .list_for_post(post_id, viewer.user_id())
        .await?;

    Ok(HttpResponse::Ok().json(PostDetailResponse {
        post: post_response(post),
        replies: replies.into_iter().map(reply_response).collect(),
    }))
}

/// DELETE /posts/{id}
///
/// Reply images go with the post since the replies cascade.
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or(DomainError::NotFound {
            entity_type: "Post",
            id: post_id,
        })?;
    identity.actor().authorize(post.poster_id)?;

    let reply_images: Vec<String> = state
        .replies
        .list_for_post(post.id, None)
        .await?
        .into_iter()
        .filter_map(|view| view.reply.image_url)
        .collect();

    state.posts.delete(post.id).await?;
    state
        .discard_images(post.image_url.into_iter().chain(reply_images))
        .await;

    tracing::info!(post_id = post.id, deleted_by = identity.user_id, "Post deleted");

    Ok(HttpResponse::Ok().json(MessageResponse::new("Post deleted successfully")))
}
