pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod models;
pub mod params;
pub mod repositories;
pub mod routes;
pub mod storage;
pub mod visibility;

use crate::config::AppConfig;
use crate::storage::MediaStorage;
use axum::extract::FromRef;

pub use routes::create_router;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: AppConfig,
    pub media: MediaStorage,
}

impl AppState {
    pub fn new(db: sqlx::PgPool, config: AppConfig) -> Self {
        let media = MediaStorage::new(&config.media_root, config.media_prefix());
        Self { db, config, media }
    }
}

impl FromRef<AppState> for sqlx::PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for MediaStorage {
    fn from_ref(state: &AppState) -> Self {
        state.media.clone()
    }
}
