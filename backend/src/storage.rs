use axum::body::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Directory under the media root that post images land in.
const POST_IMAGES_DIR: &str = "post_images";

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp"];

#[derive(Clone, Debug)]
pub struct MediaStorage {
    pub root: PathBuf,
    pub base_url: String,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    /// Lower-cased image extension of an uploaded file name, if it is one we accept.
    pub fn image_extension(original_filename: &str) -> Option<String> {
        Path::new(original_filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .filter(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
    }

    /// Writes the image and returns its path relative to the media root.
    pub async fn save_post_image(
        &self,
        file_bytes: Bytes,
        extension: &str,
    ) -> Result<String, std::io::Error> {
        let relative = format!("{}/{}.{}", POST_IMAGES_DIR, Uuid::new_v4(), extension);
        let file_path = self.root.join(&relative);

        fs::create_dir_all(self.root.join(POST_IMAGES_DIR)).await?;
        fs::write(&file_path, file_bytes).await?;

        Ok(relative)
    }

    /// Removes a stored file; a file that is already gone is not an error.
    pub async fn delete(&self, relative: &str) -> Result<(), std::io::Error> {
        match fs::remove_file(self.root.join(relative)).await {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    pub fn url_for(&self, relative: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), relative)
    }
}
