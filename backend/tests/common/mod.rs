// Shared helpers for the integration tests. Not every test file uses all of them.
#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use blogicum::{
    AppState, auth,
    config::AppConfig,
    create_router,
    models::{Category, Location, Post, User},
    repositories::users,
};
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::PgPool;
use std::path::PathBuf;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-secret";
pub const TEST_PASSWORD: &str = "a-long-password";

pub fn test_config(media_root: &PathBuf) -> AppConfig {
    AppConfig {
        database_url: String::new(),
        run_migrations: false,
        server_addr: "127.0.0.1:0".to_string(),
        media_root: media_root.to_string_lossy().into_owned(),
        media_url: "/media".to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        jwt_expiry_hours: 1,
        posts_per_page: 10,
        max_upload_bytes: 1024 * 1024,
        log_filter: "warn".to_string(),
    }
}

pub fn test_media_root() -> PathBuf {
    std::env::temp_dir().join(format!("blogicum-test-{}", Uuid::new_v4()))
}

pub fn create_test_app(pool: PgPool) -> Router {
    create_test_app_with_media(pool, &test_media_root())
}

pub fn create_test_app_with_media(pool: PgPool, media_root: &PathBuf) -> Router {
    create_router(AppState::new(pool, test_config(media_root)))
}

/// Inserts a user directly and returns it with a valid bearer token.
pub async fn create_user(pool: &PgPool, username: &str, is_staff: bool) -> (User, String) {
    let hash = auth::hash_password(TEST_PASSWORD).unwrap();
    let user = users::create(pool, username, &hash, is_staff).await.unwrap();
    let token = auth::issue_token(&user, TEST_SECRET, 1).unwrap();
    (user, token)
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref());
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}

pub async fn create_category(app: &Router, staff_token: &str, slug: &str, published: bool) -> Category {
    let (status, body) = send(
        app,
        Method::POST,
        "/categories/",
        Some(staff_token),
        Some(json!({
            "title": format!("Category {}", slug),
            "description": "Posts about things",
            "slug": slug,
            "is_published": published,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "Failed to create category: {}", body);
    serde_json::from_value(body).unwrap()
}

pub async fn create_location(app: &Router, staff_token: &str, name: &str) -> Location {
    let (status, body) = send(
        app,
        Method::POST,
        "/locations/",
        Some(staff_token),
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "Failed to create location: {}", body);
    serde_json::from_value(body).unwrap()
}

pub fn post_body(
    title: &str,
    category_id: i32,
    pub_date: DateTime<Utc>,
    is_published: bool,
) -> Value {
    json!({
        "title": title,
        "text": format!("Text of {}", title),
        "pub_date": pub_date,
        "category_id": category_id,
        "is_published": is_published,
    })
}

pub async fn create_post(
    app: &Router,
    token: &str,
    title: &str,
    category_id: i32,
    pub_date: DateTime<Utc>,
    is_published: bool,
) -> Post {
    let (status, body) = send(
        app,
        Method::POST,
        "/posts/",
        Some(token),
        Some(post_body(title, category_id, pub_date, is_published)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "Failed to create post: {}", body);
    serde_json::from_value(body).unwrap()
}

pub async fn add_comment(app: &Router, token: &str, post_id: i32, text: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        &format!("/posts/{}/comments/", post_id),
        Some(token),
        Some(json!({ "text": text })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "Failed to add comment: {}", body);
    body
}

/// Titles of the posts in a listing response, in order.
pub fn titles(listing: &Value) -> Vec<String> {
    listing
        .as_array()
        .expect("listing is an array")
        .iter()
        .map(|p| p["title"].as_str().unwrap().to_string())
        .collect()
}
