use crate::{
    AppState,
    auth,
    error::AppError,
    extractors::{CurrentUser, MaybeUser, StaffUser},
    models::{PostView, User},
    params::PaginationParams,
    repositories::{
        posts,
        users::{self, LoginForm, ProfileForm, RegistrationForm},
    },
    routes::posts::remove_image,
};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};
use validator::Validate;

#[derive(Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: User,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: DateTime<Utc>,
    pub posts: Vec<PostView>,
}

pub async fn register(
    State(pool): State<PgPool>,
    payload: Result<Json<RegistrationForm>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let password_hash = auth::hash_password(&payload.password1)?;
    let user = users::create(&pool, &payload.username, &password_hash, false).await?;
    info!(user_id = user.id, username = %user.username, "Registered user");

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginForm>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let Json(payload) = payload?;
    let user = users::get_by_username(&state.db, &payload.username)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !auth::verify_password(&payload.password, &user.password_hash)? {
        warn!(username = %payload.username, "Failed login attempt");
        return Err(AppError::Unauthorized);
    }

    let access_token =
        auth::issue_token(&user, &state.config.jwt_secret, state.config.jwt_expiry_hours)?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        user,
    }))
}

/// A user's public profile. The owner sees every post they wrote,
/// everyone else only the visible ones.
pub async fn profile(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(username): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = users::get_by_username(&state.db, &username)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    let posts = posts::list_by_author(
        &state.db,
        Utc::now(),
        user.id,
        viewer.id() == Some(user.id),
        params.limit(state.config.posts_per_page),
        params.offset(),
    )
    .await?;

    Ok(Json(ProfileResponse {
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        date_joined: user.date_joined,
        posts,
    }))
}

pub async fn edit_profile(
    State(pool): State<PgPool>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<ProfileForm>, JsonRejection>,
) -> Result<Json<User>, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let updated = users::update_profile(&pool, user.id, &payload)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    info!(user_id = user.id, "Updated profile");

    Ok(Json(updated))
}

pub async fn delete_user(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Path(username): Path<String>,
) -> Result<StatusCode, AppError> {
    let images = users::delete_by_username(&state.db, &username)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    info!(username = %username, staff_id = staff.id, "Deleted user with their posts and comments");

    for image in images {
        remove_image(&state.media, &image).await;
    }

    Ok(StatusCode::NO_CONTENT)
}
