use crate::{
    AppState,
    error::AppError,
    extractors::{CurrentUser, MaybeUser},
    models::{CommentView, Post, PostView},
    params::PaginationParams,
    repositories::{
        comments,
        posts::{self, PostForm},
    },
    storage::MediaStorage,
};
use axum::{
    Json,
    extract::{
        Multipart, Path, Query, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{error, info, warn};
use validator::Validate;

#[derive(Serialize)]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub post: PostView,
    pub image_url: Option<String>,
    pub comments: Vec<CommentView>,
}

/// Loads a post the caller is allowed to change.
pub(crate) async fn owned_post(pool: &PgPool, id: i32, user_id: i32) -> Result<Post, AppError> {
    let post = posts::get(pool, id)
        .await?
        .ok_or(AppError::NotFound("Post"))?;

    if post.author_id != user_id {
        warn!(post_id = id, user_id, author_id = post.author_id, "Non-author attempted to modify post");
        return Err(AppError::Forbidden);
    }
    Ok(post)
}

/// Loads a post for reading: visible posts for everyone, hidden ones only
/// for their author.
pub(crate) async fn readable_post(
    pool: &PgPool,
    id: i32,
    viewer_id: Option<i32>,
) -> Result<PostView, AppError> {
    let post = posts::get_view(pool, id)
        .await?
        .ok_or(AppError::NotFound("Post"))?;

    if post.is_visible_at(Utc::now()) || viewer_id == Some(post.post.author_id) {
        Ok(post)
    } else {
        Err(AppError::NotFound("Post"))
    }
}

pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Vec<PostView>>, AppError> {
    let posts = posts::list_visible(
        &state.db,
        Utc::now(),
        None,
        params.limit(state.config.posts_per_page),
        params.offset(),
    )
    .await?;

    Ok(Json(posts))
}

pub async fn get_one_post(
    State(state): State<AppState>,
    viewer: MaybeUser,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<PostDetailResponse>, AppError> {
    let Path(id) = path?;
    let post = readable_post(&state.db, id, viewer.id()).await?;
    let comments = comments::list_for_post(&state.db, id).await?;
    let image_url = post.post.image.as_deref().map(|i| state.media.url_for(i));

    Ok(Json(PostDetailResponse {
        post,
        image_url,
        comments,
    }))
}

pub async fn create_post(
    State(pool): State<PgPool>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<PostForm>, JsonRejection>,
) -> Result<(StatusCode, Json<Post>), AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let post = posts::create(&pool, user.id, &payload).await?;
    info!(post_id = post.id, author_id = user.id, "Created post");

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update_post(
    State(pool): State<PgPool>,
    CurrentUser(user): CurrentUser,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<PostForm>, JsonRejection>,
) -> Result<Json<Post>, AppError> {
    let Path(id) = path?;
    owned_post(&pool, id, user.id).await?;
    let Json(payload) = payload?;
    payload.validate()?;

    let post = posts::update(&pool, id, &payload)
        .await?
        .ok_or(AppError::NotFound("Post"))?;
    info!(post_id = id, "Updated post");

    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = path?;
    owned_post(&state.db, id, user.id).await?;

    let image = posts::delete(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Post"))?;
    info!(post_id = id, deleted_by = user.id, "Deleted post");

    if let Some(image) = image {
        remove_image(&state.media, &image).await;
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn upload_image(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    path: Result<Path<i32>, PathRejection>,
    mut multipart: Multipart,
) -> Result<Json<Post>, AppError> {
    let Path(id) = path?;
    let previous = owned_post(&state.db, id, user.id).await?.image;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed upload: {}", e)))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let extension = field
            .file_name()
            .and_then(MediaStorage::image_extension)
            .ok_or_else(|| AppError::BadRequest("Upload a valid image file".to_string()))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read image: {}", e)))?;
        if data.is_empty() {
            return Err(AppError::BadRequest("The submitted image is empty".to_string()));
        }
        upload = Some((data, extension));
    }

    let (data, extension) =
        upload.ok_or_else(|| AppError::BadRequest("Missing field: image".to_string()))?;

    let stored = state
        .media
        .save_post_image(data, &extension)
        .await
        .map_err(|e| AppError::Anyhow(e.into()))?;

    let Some(post) = posts::set_image(&state.db, id, Some(&stored)).await? else {
        remove_image(&state.media, &stored).await;
        return Err(AppError::NotFound("Post"));
    };
    info!(post_id = id, image = %stored, "Stored post image");

    if let Some(previous) = previous {
        remove_image(&state.media, &previous).await;
    }

    Ok(Json(post))
}

pub(crate) async fn remove_image(media: &MediaStorage, relative: &str) {
    if let Err(e) = media.delete(relative).await {
        error!(error = %e, image = relative, "Failed to remove stored image");
    }
}
