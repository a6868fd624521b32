use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use crate::models::Location;

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub struct LocationForm {
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    #[serde(default = "default_true")]
    pub is_published: bool,
}

pub async fn list(pool: &PgPool) -> Result<Vec<Location>, sqlx::Error> {
    sqlx::query_as::<_, Location>(
        "SELECT id, name, is_published, created_at FROM locations ORDER BY name ASC, id ASC",
    )
    .fetch_all(pool)
    .await
}

pub async fn get(pool: &PgPool, id: i32) -> Result<Option<Location>, sqlx::Error> {
    sqlx::query_as::<_, Location>(
        "SELECT id, name, is_published, created_at FROM locations WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn create(pool: &PgPool, form: &LocationForm) -> Result<Location, sqlx::Error> {
    sqlx::query_as::<_, Location>(
        r#"
        INSERT INTO locations (name, is_published)
        VALUES ($1, $2)
        RETURNING id, name, is_published, created_at
        "#,
    )
    .bind(&form.name)
    .bind(form.is_published)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: i32,
    form: &LocationForm,
) -> Result<Option<Location>, sqlx::Error> {
    sqlx::query_as::<_, Location>(
        r#"
        UPDATE locations
        SET name = $1, is_published = $2
        WHERE id = $3
        RETURNING id, name, is_published, created_at
        "#,
    )
    .bind(&form.name)
    .bind(form.is_published)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Posts at the deleted location keep existing with no location.
pub async fn delete(pool: &PgPool, id: i32) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM locations WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
