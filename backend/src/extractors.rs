use crate::config::AppConfig;
use crate::error::AppError;
use crate::{auth, models::User, repositories::users};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use sqlx::PgPool;
use tracing::debug;

/// The authenticated user behind a bearer token.
pub struct CurrentUser(pub User);

/// Like [`CurrentUser`] but tolerates anonymous requests and stale tokens.
pub struct MaybeUser(pub Option<User>);

/// An authenticated user with staff rights.
pub struct StaffUser(pub User);

fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(Some)
        .ok_or(AppError::Unauthorized)
}

async fn resolve_user<S>(parts: &Parts, state: &S) -> Result<Option<User>, AppError>
where
    PgPool: FromRef<S>,
    AppConfig: FromRef<S>,
{
    let Some(token) = bearer_token(parts)? else {
        return Ok(None);
    };

    let config = AppConfig::from_ref(state);
    let claims = auth::decode_token(token, &config.jwt_secret)?;

    // A token outlives its user when the account is deleted.
    let pool = PgPool::from_ref(state);
    let user = users::get_by_id(&pool, claims.user_id()?)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(Some(user))
}

impl<S> FromRequestParts<S> for CurrentUser
where
    PgPool: FromRef<S>,
    AppConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        resolve_user(parts, state)
            .await?
            .map(CurrentUser)
            .ok_or(AppError::Unauthorized)
    }
}

impl<S> FromRequestParts<S> for MaybeUser
where
    PgPool: FromRef<S>,
    AppConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // An expired or orphaned token reads public pages as an anonymous visitor.
        match resolve_user(parts, state).await {
            Ok(user) => Ok(MaybeUser(user)),
            Err(AppError::Unauthorized) => {
                debug!("Ignoring unusable bearer token on a public route");
                Ok(MaybeUser(None))
            }
            Err(e) => Err(e),
        }
    }
}

impl<S> FromRequestParts<S> for StaffUser
where
    PgPool: FromRef<S>,
    AppConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_staff {
            return Err(AppError::Forbidden);
        }
        Ok(StaffUser(user))
    }
}

impl MaybeUser {
    pub fn id(&self) -> Option<i32> {
        self.0.as_ref().map(|u| u.id)
    }
}
