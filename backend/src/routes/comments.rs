use crate::{
    error::AppError,
    extractors::CurrentUser,
    models::Comment,
    repositories::comments::{self, CommentForm},
    routes::posts::readable_post,
};
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use sqlx::PgPool;
use tracing::{info, warn};
use validator::Validate;

async fn owned_comment(
    pool: &PgPool,
    post_id: i32,
    comment_id: i32,
    user_id: i32,
) -> Result<Comment, AppError> {
    let comment = comments::get(pool, post_id, comment_id)
        .await?
        .ok_or(AppError::NotFound("Comment"))?;

    if comment.author_id != user_id {
        warn!(comment_id, user_id, author_id = comment.author_id, "Non-author attempted to modify comment");
        return Err(AppError::Forbidden);
    }
    Ok(comment)
}

pub async fn add_comment(
    State(pool): State<PgPool>,
    CurrentUser(user): CurrentUser,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<CommentForm>, JsonRejection>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let Path(post_id) = path?;
    // Commenting needs the same access as reading.
    readable_post(&pool, post_id, Some(user.id)).await?;
    let Json(payload) = payload?;
    payload.validate()?;

    let comment = comments::create(&pool, post_id, user.id, &payload).await?;
    info!(comment_id = comment.id, post_id, author_id = user.id, "Created comment");

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn edit_comment(
    State(pool): State<PgPool>,
    CurrentUser(user): CurrentUser,
    path: Result<Path<(i32, i32)>, PathRejection>,
    payload: Result<Json<CommentForm>, JsonRejection>,
) -> Result<Json<Comment>, AppError> {
    let Path((post_id, comment_id)) = path?;
    owned_comment(&pool, post_id, comment_id, user.id).await?;
    let Json(payload) = payload?;
    payload.validate()?;

    let comment = comments::update(&pool, comment_id, &payload)
        .await?
        .ok_or(AppError::NotFound("Comment"))?;
    info!(comment_id, post_id, "Updated comment");

    Ok(Json(comment))
}

pub async fn delete_comment(
    State(pool): State<PgPool>,
    CurrentUser(user): CurrentUser,
    path: Result<Path<(i32, i32)>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path((post_id, comment_id)) = path?;
    owned_comment(&pool, post_id, comment_id, user.id).await?;

    if comments::delete(&pool, comment_id).await? == 0 {
        return Err(AppError::NotFound("Comment"));
    }
    info!(comment_id, post_id, deleted_by = user.id, "Deleted comment");

    Ok(StatusCode::NO_CONTENT)
}
