use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use crate::models::{Comment, CommentView};

#[derive(Debug, Deserialize, Validate)]
pub struct CommentForm {
    #[validate(length(min = 1))]
    pub text: String,
}

/// Comments of a post in the order they were written.
pub async fn list_for_post(pool: &PgPool, post_id: i32) -> Result<Vec<CommentView>, sqlx::Error> {
    sqlx::query_as::<_, CommentView>(
        r#"
        SELECT
            cm.id,
            cm.text,
            cm.author_id,
            cm.post_id,
            cm.created_at,
            u.username AS author_username
        FROM
            comments cm
        JOIN users u ON u.id = cm.author_id
        WHERE
            cm.post_id = $1
        ORDER BY
            cm.created_at ASC, cm.id ASC
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
}

/// A comment, provided it belongs to the given post.
pub async fn get(
    pool: &PgPool,
    post_id: i32,
    comment_id: i32,
) -> Result<Option<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        "SELECT id, text, author_id, post_id, created_at FROM comments WHERE id = $1 AND post_id = $2",
    )
    .bind(comment_id)
    .bind(post_id)
    .fetch_optional(pool)
    .await
}

pub async fn create(
    pool: &PgPool,
    post_id: i32,
    author_id: i32,
    form: &CommentForm,
) -> Result<Comment, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (text, author_id, post_id)
        VALUES ($1, $2, $3)
        RETURNING id, text, author_id, post_id, created_at
        "#,
    )
    .bind(&form.text)
    .bind(author_id)
    .bind(post_id)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    comment_id: i32,
    form: &CommentForm,
) -> Result<Option<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        UPDATE comments
        SET text = $1
        WHERE id = $2
        RETURNING id, text, author_id, post_id, created_at
        "#,
    )
    .bind(&form.text)
    .bind(comment_id)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, comment_id: i32) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(comment_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
