use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    db,
    error::AppError,
    models::{Post, PostView},
    visibility::VISIBLE_SQL,
};

const POST_COLUMNS: &str = "id, title, text, pub_date, author_id, location_id, category_id, image, is_published, created_at";

const POST_VIEW_SELECT: &str = r#"
    SELECT
        p.id,
        p.title,
        p.text,
        p.pub_date,
        p.author_id,
        p.location_id,
        p.category_id,
        p.image,
        p.is_published,
        p.created_at,
        u.username AS author_username,
        c.title AS category_title,
        c.slug AS category_slug,
        c.is_published AS category_is_published,
        CASE WHEN l.is_published THEN l.name END AS location_name,
        (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count
    FROM
        posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN locations l ON l.id = p.location_id
"#;

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub struct PostForm {
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    #[validate(length(min = 1))]
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub location_id: Option<i32>,
    /// Nullable in storage so deleting a category can clear it, but every
    /// submitted post has to name one.
    #[validate(required)]
    pub category_id: Option<i32>,
    #[serde(default = "default_true")]
    pub is_published: bool,
}

fn missing_reference(e: sqlx::Error) -> AppError {
    if db::is_foreign_key_violation(&e) {
        AppError::BadRequest("Unknown category or location".to_string())
    } else {
        e.into()
    }
}

/// Visible posts, newest `pub_date` first, optionally limited to one category.
pub async fn list_visible(
    pool: &PgPool,
    now: DateTime<Utc>,
    category_id: Option<i32>,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostView>, sqlx::Error> {
    let query = format!(
        r#"{}
        WHERE
            {}
        AND
            ($2::INTEGER IS NULL OR p.category_id = $2)
        ORDER BY
            p.pub_date DESC, p.id DESC
        LIMIT $3 OFFSET $4"#,
        POST_VIEW_SELECT, VISIBLE_SQL
    );
    sqlx::query_as::<_, PostView>(&query)
        .bind(now)
        .bind(category_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

/// Posts written by one author. Hidden posts are included only when
/// `include_hidden` is set, which is how authors see their own drafts.
pub async fn list_by_author(
    pool: &PgPool,
    now: DateTime<Utc>,
    author_id: i32,
    include_hidden: bool,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostView>, sqlx::Error> {
    let query = format!(
        r#"{}
        WHERE
            p.author_id = $2
        AND
            ($3 OR {})
        ORDER BY
            p.pub_date DESC, p.id DESC
        LIMIT $4 OFFSET $5"#,
        POST_VIEW_SELECT, VISIBLE_SQL
    );
    sqlx::query_as::<_, PostView>(&query)
        .bind(now)
        .bind(author_id)
        .bind(include_hidden)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

pub async fn get_view(pool: &PgPool, id: i32) -> Result<Option<PostView>, sqlx::Error> {
    let query = format!("{} WHERE p.id = $1", POST_VIEW_SELECT);
    sqlx::query_as::<_, PostView>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn get(pool: &PgPool, id: i32) -> Result<Option<Post>, sqlx::Error> {
    let query = format!("SELECT {} FROM posts WHERE id = $1", POST_COLUMNS);
    sqlx::query_as::<_, Post>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &PgPool, author_id: i32, form: &PostForm) -> Result<Post, AppError> {
    let query = format!(
        r#"
        INSERT INTO posts (
            title,
            text,
            pub_date,
            author_id,
            location_id,
            category_id,
            is_published
        ) VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {}
        "#,
        POST_COLUMNS
    );
    sqlx::query_as::<_, Post>(&query)
        .bind(&form.title)
        .bind(&form.text)
        .bind(form.pub_date)
        .bind(author_id)
        .bind(form.location_id)
        .bind(form.category_id)
        .bind(form.is_published)
        .fetch_one(pool)
        .await
        .map_err(missing_reference)
}

pub async fn update(pool: &PgPool, id: i32, form: &PostForm) -> Result<Option<Post>, AppError> {
    let query = format!(
        r#"
        UPDATE
            posts
        SET
            title = $1,
            text = $2,
            pub_date = $3,
            location_id = $4,
            category_id = $5,
            is_published = $6
        WHERE
            id = $7
        RETURNING {}
        "#,
        POST_COLUMNS
    );
    sqlx::query_as::<_, Post>(&query)
        .bind(&form.title)
        .bind(&form.text)
        .bind(form.pub_date)
        .bind(form.location_id)
        .bind(form.category_id)
        .bind(form.is_published)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(missing_reference)
}

pub async fn set_image(
    pool: &PgPool,
    id: i32,
    image: Option<&str>,
) -> Result<Option<Post>, sqlx::Error> {
    let query = format!(
        "UPDATE posts SET image = $1 WHERE id = $2 RETURNING {}",
        POST_COLUMNS
    );
    sqlx::query_as::<_, Post>(&query)
        .bind(image)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Deletes the post and, through the foreign key, its comments. Returns the
/// stored image of the deleted post: `None` when there was no such post.
pub async fn delete(pool: &PgPool, id: i32) -> Result<Option<Option<String>>, sqlx::Error> {
    sqlx::query_scalar::<_, Option<String>>("DELETE FROM posts WHERE id = $1 RETURNING image")
        .bind(id)
        .fetch_optional(pool)
        .await
}
