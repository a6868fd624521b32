use serde::Deserialize;
use sqlx::PgPool;
use validator::{Validate, ValidationError};

use crate::{db, error::AppError, models::User};

const USER_COLUMNS: &str =
    "id, username, password_hash, first_name, last_name, email, is_staff, date_joined";

const MIN_PASSWORD_LENGTH: usize = 8;

/// Letters, digits and `@ . + - _`, like the usual account name rules.
pub fn validate_username(value: &str) -> Result<(), ValidationError> {
    let ok = value
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if ok {
        Ok(())
    } else {
        Err(ValidationError::new("username_charset"))
    }
}

pub fn validate_password(value: &str) -> Result<(), ValidationError> {
    if value.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::new("password_too_short"));
    }
    if value.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new("password_entirely_numeric"));
    }
    Ok(())
}

fn validate_passwords_match(form: &RegistrationForm) -> Result<(), ValidationError> {
    if form.password1 == form.password2 {
        Ok(())
    } else {
        Err(ValidationError::new("password_mismatch"))
    }
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_passwords_match", skip_on_field_errors = false))]
pub struct RegistrationForm {
    #[validate(length(min = 1, max = 150), custom(function = "validate_username"))]
    pub username: String,
    #[validate(custom(function = "validate_password"))]
    pub password1: String,
    pub password2: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProfileForm {
    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,
    #[validate(email)]
    pub email: Option<String>,
}

pub async fn create(
    pool: &PgPool,
    username: &str,
    password_hash: &str,
    is_staff: bool,
) -> Result<User, AppError> {
    let query = format!(
        "INSERT INTO users (username, password_hash, is_staff) VALUES ($1, $2, $3) RETURNING {}",
        USER_COLUMNS
    );
    sqlx::query_as::<_, User>(&query)
        .bind(username)
        .bind(password_hash)
        .bind(is_staff)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            if db::is_unique_violation(&e) {
                AppError::Conflict(format!("A user named '{}' already exists", username))
            } else {
                e.into()
            }
        })
}

pub async fn get_by_id(pool: &PgPool, id: i32) -> Result<Option<User>, sqlx::Error> {
    let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
    sqlx::query_as::<_, User>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn get_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    let query = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
    sqlx::query_as::<_, User>(&query)
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub async fn update_profile(
    pool: &PgPool,
    id: i32,
    form: &ProfileForm,
) -> Result<Option<User>, sqlx::Error> {
    let query = format!(
        "UPDATE users SET first_name = $1, last_name = $2, email = $3 WHERE id = $4 RETURNING {}",
        USER_COLUMNS
    );
    sqlx::query_as::<_, User>(&query)
        .bind(&form.first_name)
        .bind(&form.last_name)
        .bind(form.email.as_deref().unwrap_or_default())
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Deletes the user; their posts and comments go with them. Returns the
/// image paths the deleted posts referenced, or `None` if no such user.
pub async fn delete_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<Vec<String>>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let images = sqlx::query_scalar::<_, String>(
        r#"
        SELECT p.image
        FROM posts p
        JOIN users u ON u.id = p.author_id
        WHERE u.username = $1 AND p.image IS NOT NULL
        "#,
    )
    .bind(username)
    .fetch_all(&mut *tx)
    .await?;

    let result = sqlx::query("DELETE FROM users WHERE username = $1")
        .bind(username)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok((result.rows_affected() > 0).then_some(images))
}
