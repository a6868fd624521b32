use crate::{
    error::AppError,
    extractors::{MaybeUser, StaffUser},
    models::Location,
    repositories::locations::{self, LocationForm},
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
use tracing::info;
use validator::Validate;

fn is_staff(viewer: &MaybeUser) -> bool {
    viewer.0.as_ref().is_some_and(|u| u.is_staff)
}

pub async fn list_locations(
    State(pool): State<PgPool>,
    viewer: MaybeUser,
) -> Result<Json<Vec<Location>>, AppError> {
    let staff = is_staff(&viewer);
    let locations = locations::list(&pool)
        .await?
        .into_iter()
        .filter(|l| staff || l.is_published)
        .collect();

    Ok(Json(locations))
}

pub async fn get_location(
    State(pool): State<PgPool>,
    viewer: MaybeUser,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<Location>, AppError> {
    let Path(id) = path?;
    let staff = is_staff(&viewer);
    let location = locations::get(&pool, id)
        .await?
        .filter(|l| staff || l.is_published)
        .ok_or(AppError::NotFound("Location"))?;

    Ok(Json(location))
}

pub async fn create_location(
    State(pool): State<PgPool>,
    StaffUser(staff): StaffUser,
    payload: Result<Json<LocationForm>, JsonRejection>,
) -> Result<(StatusCode, Json<Location>), AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let location = locations::create(&pool, &payload).await?;
    info!(location_id = location.id, staff_id = staff.id, "Created location");

    Ok((StatusCode::CREATED, Json(location)))
}

pub async fn update_location(
    State(pool): State<PgPool>,
    StaffUser(staff): StaffUser,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<LocationForm>, JsonRejection>,
) -> Result<Json<Location>, AppError> {
    let Path(id) = path?;
    let Json(payload) = payload?;
    payload.validate()?;

    let location = locations::update(&pool, id, &payload)
        .await?
        .ok_or(AppError::NotFound("Location"))?;
    info!(location_id = id, staff_id = staff.id, "Updated location");

    Ok(Json(location))
}

pub async fn delete_location(
    State(pool): State<PgPool>,
    StaffUser(staff): StaffUser,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = path?;
    if locations::delete(&pool, id).await? == 0 {
        return Err(AppError::NotFound("Location"));
    }
    info!(location_id = id, staff_id = staff.id, "Deleted location");

    Ok(StatusCode::NO_CONTENT)
}
