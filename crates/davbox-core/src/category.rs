//! File category classification
//!
//! Uploads are accepted or rejected on extension alone; there is no
//! content sniffing. The category decides which pipeline steps apply
//! (images and videos get thumbnails, archives and anything else do not).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

/// File category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "file_category", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Image,
    Video,
    Archive,
    Other,
}

impl FileCategory {
    /// Whether a thumbnail is derived for this category.
    pub fn wants_thumbnail(&self) -> bool {
        matches!(self, FileCategory::Image | FileCategory::Video)
    }
}

impl std::fmt::Display for FileCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileCategory::Image => write!(f, "image"),
            FileCategory::Video => write!(f, "video"),
            FileCategory::Archive => write!(f, "archive"),
            FileCategory::Other => write!(f, "other"),
        }
    }
}

/// Extension allow-list plus the per-category mapping, both injected from
/// configuration. The allow-list is usually the union of the category
/// lists; an allowed extension in no category list classifies as `Other`.
#[derive(Debug, Clone)]
pub struct CategoryRules {
    allowed: Vec<String>,
    image: Vec<String>,
    video: Vec<String>,
    archive: Vec<String>,
}

impl CategoryRules {
    pub fn new(
        allowed: Vec<String>,
        image: Vec<String>,
        video: Vec<String>,
        archive: Vec<String>,
    ) -> Self {
        Self {
            allowed,
            image,
            video,
            archive,
        }
    }

    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(
            config.allowed_extensions.clone(),
            config.image_extensions.clone(),
            config.video_extensions.clone(),
            config.archive_extensions.clone(),
        )
    }

    /// Lowercased extension of `filename`, or None when there is no dot.
    fn extension(filename: &str) -> Option<String> {
        filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
    }

    /// Classify `filename` by extension, rejecting names with no extension
    /// or an extension outside the allow-list.
    pub fn classify(&self, filename: &str) -> Result<FileCategory, AppError> {
        let ext = Self::extension(filename).ok_or_else(|| {
            AppError::InvalidInput(format!("File type not allowed: {}", filename))
        })?;
        if !self.allowed.iter().any(|a| a == &ext) {
            return Err(AppError::InvalidInput(format!(
                "File type not allowed: {}",
                filename
            )));
        }
        if self.image.iter().any(|a| a == &ext) {
            Ok(FileCategory::Image)
        } else if self.video.iter().any(|a| a == &ext) {
            Ok(FileCategory::Video)
        } else if self.archive.iter().any(|a| a == &ext) {
            Ok(FileCategory::Archive)
        } else {
            Ok(FileCategory::Other)
        }
    }
}

/// Classify a filename against `rules`. Convenience wrapper used by the
/// ingest pipeline.
pub fn classify_filename(rules: &CategoryRules, filename: &str) -> Result<FileCategory, AppError> {
    rules.classify(filename)
}
