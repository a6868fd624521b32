use serde::Deserialize;
use sqlx::PgPool;
use validator::{Validate, ValidationError};

use crate::{db, error::AppError, models::Category};

const CATEGORY_COLUMNS: &str = "id, title, description, slug, is_published, created_at";

fn default_true() -> bool {
    true
}

/// Latin letters, digits, hyphen and underscore.
pub fn validate_slug(value: &str) -> Result<(), ValidationError> {
    let ok = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(ValidationError::new("slug_charset"))
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryForm {
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    pub description: String,
    #[validate(length(min = 1, max = 50), custom(function = "validate_slug"))]
    pub slug: String,
    #[serde(default = "default_true")]
    pub is_published: bool,
}

fn slug_conflict(slug: &str) -> impl FnOnce(sqlx::Error) -> AppError + '_ {
    move |e| {
        if db::is_unique_violation(&e) {
            AppError::Conflict(format!("A category with slug '{}' already exists", slug))
        } else {
            e.into()
        }
    }
}

pub async fn list(pool: &PgPool) -> Result<Vec<Category>, sqlx::Error> {
    let query = format!("SELECT {} FROM categories ORDER BY title ASC, id ASC", CATEGORY_COLUMNS);
    sqlx::query_as::<_, Category>(&query).fetch_all(pool).await
}

pub async fn get_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Category>, sqlx::Error> {
    let query = format!("SELECT {} FROM categories WHERE slug = $1", CATEGORY_COLUMNS);
    sqlx::query_as::<_, Category>(&query)
        .bind(slug)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &PgPool, form: &CategoryForm) -> Result<Category, AppError> {
    let query = format!(
        r#"
        INSERT INTO categories (title, description, slug, is_published)
        VALUES ($1, $2, $3, $4)
        RETURNING {}
        "#,
        CATEGORY_COLUMNS
    );
    sqlx::query_as::<_, Category>(&query)
        .bind(&form.title)
        .bind(&form.description)
        .bind(&form.slug)
        .bind(form.is_published)
        .fetch_one(pool)
        .await
        .map_err(slug_conflict(&form.slug))
}

pub async fn update(
    pool: &PgPool,
    slug: &str,
    form: &CategoryForm,
) -> Result<Option<Category>, AppError> {
    let query = format!(
        r#"
        UPDATE categories
        SET title = $1, description = $2, slug = $3, is_published = $4
        WHERE slug = $5
        RETURNING {}
        "#,
        CATEGORY_COLUMNS
    );
    sqlx::query_as::<_, Category>(&query)
        .bind(&form.title)
        .bind(&form.description)
        .bind(&form.slug)
        .bind(form.is_published)
        .bind(slug)
        .fetch_optional(pool)
        .await
        .map_err(slug_conflict(&form.slug))
}

/// Posts of the deleted category keep existing with no category.
pub async fn delete(pool: &PgPool, slug: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM categories WHERE slug = $1")
        .bind(slug)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
