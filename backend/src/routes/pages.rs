use crate::error::AppError;
use axum::{
    Json,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::any::Any;
use tracing::{debug, error};

/// Fallback for every path no route matches.
pub async fn page_not_found(uri: Uri) -> AppError {
    debug!(%uri, "No route matched");
    AppError::NotFound("Page")
}

/// Turns a panicking handler into a plain 500 response.
pub fn failure_500(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail: &str = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic payload"
    };
    error!(panic = %detail, "Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal Server Error" })),
    )
        .into_response()
}
