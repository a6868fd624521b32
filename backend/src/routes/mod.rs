pub mod categories;
pub mod comments;
pub mod locations;
pub mod pages;
pub mod posts;
pub mod users;

use crate::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    handler::HandlerWithoutStateExt,
    routing::{delete, get, post, put},
};
use tower_http::{catch_panic::CatchPanicLayer, services::ServeDir, trace::TraceLayer};

pub fn create_router(state: AppState) -> Router {
    let media = ServeDir::new(&state.config.media_root)
        .not_found_service(pages::page_not_found.into_service());
    let media_prefix = state.config.media_prefix();
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(posts::index))
        .route("/category/{slug}/", get(categories::category_posts))
        .merge(post_routes())
        .merge(user_routes())
        .merge(category_routes())
        .merge(location_routes())
        .nest_service(&media_prefix, media)
        .fallback(pages::page_not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(pages::failure_500))
        .with_state(state)
}

pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/posts/", post(posts::create_post))
        .route(
            "/posts/{id}/",
            get(posts::get_one_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        .route("/posts/{id}/image/", post(posts::upload_image))
        .route("/posts/{id}/comments/", post(comments::add_comment))
        .route(
            "/posts/{id}/comments/{comment_id}/",
            put(comments::edit_comment).delete(comments::delete_comment),
        )
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/registration/", post(users::register))
        .route("/auth/login/", post(users::login))
        .route("/profile/", put(users::edit_profile))
        .route("/profile/{username}/", get(users::profile))
        .route("/admin/users/{username}/", delete(users::delete_user))
}

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/categories/",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/categories/{slug}/",
            put(categories::update_category).delete(categories::delete_category),
        )
}

pub fn location_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/locations/",
            get(locations::list_locations).post(locations::create_location),
        )
        .route(
            "/locations/{id}/",
            get(locations::get_location)
                .put(locations::update_location)
                .delete(locations::delete_location),
        )
}
