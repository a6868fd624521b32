use crate::{
    AppState,
    error::AppError,
    extractors::{MaybeUser, StaffUser},
    models::{Category, PostView},
    params::PaginationParams,
    repositories::{
        categories::{self, CategoryForm},
        posts,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use validator::Validate;

#[derive(Serialize)]
pub struct CategoryPostsResponse {
    pub category: Category,
    pub posts: Vec<PostView>,
}

/// A published category with its visible posts.
pub async fn category_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<CategoryPostsResponse>, AppError> {
    let category = categories::get_by_slug(&state.db, &slug)
        .await?
        .filter(|c| c.is_published)
        .ok_or(AppError::NotFound("Category"))?;

    let posts = posts::list_visible(
        &state.db,
        Utc::now(),
        Some(category.id),
        params.limit(state.config.posts_per_page),
        params.offset(),
    )
    .await?;

    Ok(Json(CategoryPostsResponse { category, posts }))
}

/// Published categories; staff also see hidden ones.
pub async fn list_categories(
    State(pool): State<PgPool>,
    viewer: MaybeUser,
) -> Result<Json<Vec<Category>>, AppError> {
    let is_staff = viewer.0.as_ref().is_some_and(|u| u.is_staff);
    let categories = categories::list(&pool)
        .await?
        .into_iter()
        .filter(|c| is_staff || c.is_published)
        .collect();

    Ok(Json(categories))
}

pub async fn create_category(
    State(pool): State<PgPool>,
    StaffUser(staff): StaffUser,
    payload: Result<Json<CategoryForm>, JsonRejection>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let category = categories::create(&pool, &payload).await?;
    info!(category_id = category.id, slug = %category.slug, staff_id = staff.id, "Created category");

    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(pool): State<PgPool>,
    StaffUser(staff): StaffUser,
    Path(slug): Path<String>,
    payload: Result<Json<CategoryForm>, JsonRejection>,
) -> Result<Json<Category>, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let category = categories::update(&pool, &slug, &payload)
        .await?
        .ok_or(AppError::NotFound("Category"))?;
    info!(category_id = category.id, staff_id = staff.id, "Updated category");

    Ok(Json(category))
}

pub async fn delete_category(
    State(pool): State<PgPool>,
    StaffUser(staff): StaffUser,
    Path(slug): Path<String>,
) -> Result<StatusCode, AppError> {
    if categories::delete(&pool, &slug).await? == 0 {
        return Err(AppError::NotFound("Category"));
    }
    info!(slug = %slug, staff_id = staff.id, "Deleted category");

    Ok(StatusCode::NO_CONTENT)
}
