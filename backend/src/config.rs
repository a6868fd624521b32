use ::config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub run_migrations: bool,
    pub server_addr: String,
    /// Directory uploaded post images are written under.
    pub media_root: String,
    /// URL prefix the media root is served at, e.g. `/media`.
    pub media_url: String,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub posts_per_page: i64,
    pub max_upload_bytes: usize,
    pub log_filter: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("run_migrations", true)?
            .set_default("server_addr", "127.0.0.1:8000")?
            .set_default("media_root", "media")?
            .set_default("media_url", "/media")?
            .set_default("jwt_expiry_hours", 24)?
            .set_default("posts_per_page", 10)?
            .set_default("max_upload_bytes", 5 * 1024 * 1024)?
            .set_default("log_filter", "blogicum=info,tower_http=info")?
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::default())
            .build()?;

        s.try_deserialize()
    }

    /// Media URL prefix with one leading and no trailing slash, suitable for
    /// nesting a service.
    pub fn media_prefix(&self) -> String {
        let trimmed = self.media_url.trim_matches('/');
        if trimmed.is_empty() {
            "/media".to_string()
        } else {
            format!("/{}", trimmed)
        }
    }
}
