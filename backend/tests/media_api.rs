mod common;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use common::{
    create_category, create_post, create_test_app_with_media, create_user, send, test_media_root,
};

const BOUNDARY: &str = "----blogicum-test-boundary";
const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot really a png";

fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

async fn upload(
    app: &Router,
    token: &str,
    post_id: i32,
    field: &str,
    filename: &str,
    content: &[u8],
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/posts/{}/image/", post_id))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(multipart_body(field, filename, content)))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn fetch_raw(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

#[sqlx::test]
async fn test_uploaded_image_is_stored_and_served(pool: PgPool) {
    let media_root = test_media_root();
    let app = create_test_app_with_media(pool.clone(), &media_root);
    let (_, author) = create_user(&pool, "author", true).await;
    let category = create_category(&app, &author, "photos", true).await;
    let post = create_post(&app, &author, "sunset", category.id, Utc::now(), true).await;

    let (status, body) = upload(&app, &author, post.id, "image", "sunset.PNG", PNG_BYTES).await;
    assert_eq!(status, StatusCode::OK, "upload failed: {}", body);

    let stored = body["image"].as_str().unwrap().to_string();
    assert!(stored.starts_with("post_images/"));
    assert!(stored.ends_with(".png"));
    assert!(media_root.join(&stored).exists());

    let (_, detail) = send(&app, Method::GET, &format!("/posts/{}/", post.id), None, None).await;
    let image_url = detail["image_url"].as_str().unwrap().to_string();
    assert_eq!(image_url, format!("/media/{}", stored));

    let (status, served) = fetch_raw(&app, &image_url).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(served, PNG_BYTES);

    let _ = std::fs::remove_dir_all(media_root);
}

#[sqlx::test]
async fn test_replacing_and_deleting_post_removes_old_files(pool: PgPool) {
    let media_root = test_media_root();
    let app = create_test_app_with_media(pool.clone(), &media_root);
    let (_, author) = create_user(&pool, "author", true).await;
    let category = create_category(&app, &author, "photos", true).await;
    let post = create_post(&app, &author, "sunset", category.id, Utc::now(), true).await;

    let (_, first) = upload(&app, &author, post.id, "image", "one.png", PNG_BYTES).await;
    let first = first["image"].as_str().unwrap().to_string();
    let (_, second) = upload(&app, &author, post.id, "image", "two.jpg", b"jpeg bytes").await;
    let second = second["image"].as_str().unwrap().to_string();

    assert!(!media_root.join(&first).exists());
    assert!(media_root.join(&second).exists());

    let (status, _) = send(&app, Method::DELETE, &format!("/posts/{}/", post.id), Some(&author), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(!media_root.join(&second).exists());

    let _ = std::fs::remove_dir_all(media_root);
}

#[sqlx::test]
async fn test_non_image_upload_is_rejected(pool: PgPool) {
    let app = create_test_app_with_media(pool.clone(), &test_media_root());
    let (_, author) = create_user(&pool, "author", true).await;
    let category = create_category(&app, &author, "photos", true).await;
    let post = create_post(&app, &author, "notes", category.id, Utc::now(), true).await;

    let (wrong_type, _) = upload(&app, &author, post.id, "image", "notes.txt", b"hello").await;
    let (empty, _) = upload(&app, &author, post.id, "image", "empty.png", b"").await;
    let (wrong_field, _) = upload(&app, &author, post.id, "picture", "cat.png", PNG_BYTES).await;

    assert_eq!(wrong_type, StatusCode::BAD_REQUEST);
    assert_eq!(empty, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_field, StatusCode::BAD_REQUEST);
}

#[sqlx::test]
async fn test_only_author_can_upload_image(pool: PgPool) {
    let app = create_test_app_with_media(pool.clone(), &test_media_root());
    let (_, author) = create_user(&pool, "author", true).await;
    let (_, other) = create_user(&pool, "other", false).await;
    let category = create_category(&app, &author, "photos", true).await;
    let post = create_post(&app, &author, "sunset", category.id, Utc::now(), true).await;

    let (status, _) = upload(&app, &other, post.id, "image", "cat.png", PNG_BYTES).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test]
async fn test_missing_media_file_is_a_json_404(pool: PgPool) {
    let app = create_test_app_with_media(pool, &test_media_root());

    let (status, body) = send(&app, Method::GET, "/media/post_images/nope.png", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Page not found");
}
