use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use ::image::ImageFormat;
use actix_web::web;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

const RECIPE_UPLOAD_DIR: &str = "uploads/recipe";

/// Stores uploaded images below the media root.
///
/// Paths handed out and accepted are relative to the root, so the same value
/// can be persisted and turned into a media URL.
pub struct ImageStore<'a> {
    root: &'a Path,
}

/// Sniffs the format and fully decodes the bytes; anything that is not a
/// readable image is rejected.
pub fn verify_image(bytes: &[u8]) -> AppResult<ImageFormat> {
    let format = ::image::guess_format(bytes)?;
    ::image::load_from_memory_with_format(bytes, format)?;
    Ok(format)
}

impl<'a> ImageStore<'a> {
    pub fn new(root: &'a Path) -> Self {
        ImageStore { root }
    }

    /// Verifies and writes a recipe image, returning its relative path.
    pub async fn save_recipe_image(&self, bytes: Vec<u8>) -> AppResult<String> {
        let (bytes, format) = web::block(move || verify_image(&bytes).map(|format| (bytes, format)))
            .await
            .map_err(|e| AppError::InternalServerError(format!("Image verification failed: {}", e)))??;

        let extension = format.extensions_str().first().copied().unwrap_or("img");
        let relative_path = format!("{}/{}.{}", RECIPE_UPLOAD_DIR, Uuid::new_v4(), extension);
        let path = self.path_of(&relative_path);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;

        tracing::info!("Stored recipe image at {}", path.display());
        Ok(relative_path)
    }

    /// Best-effort removal; a missing file is not an error.
    pub async fn remove(&self, relative_path: &str) {
        let path = self.path_of(relative_path);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!("Removed image {}", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to remove image {}: {}", path.display(), e),
        }
    }

    pub fn path_of(&self, relative_path: &str) -> PathBuf {
        self.root.join(relative_path)
    }
}
