//! Thumbnail generation for stored images.
//!
//! Generation is best-effort: failures are logged and reported as `false`,
//! and never leave a file behind in the thumbnail directory.

use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, ImageReader};
use uuid::Uuid;

use super::media::{extension, is_image};
use super::DEFAULT_THUMBNAIL_MAX_DIMENSION;
use crate::{Result, ShareError};

/// Writes bounded-size previews into a dedicated directory.
#[derive(Debug, Clone)]
pub struct ThumbnailGenerator {
    /// Directory receiving thumbnails, one per source filename.
    dir: PathBuf,
    /// Maximum width and height in pixels.
    max_dimension: u32,
}

impl ThumbnailGenerator {
    /// Create a generator writing into `dir` with the default 120px bound.
    ///
    /// The directory will be created if it doesn't exist.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        Ok(Self {
            dir,
            max_dimension: DEFAULT_THUMBNAIL_MAX_DIMENSION,
        })
    }

    /// Override the bounding box.
    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension.max(1);
        self
    }

    /// Thumbnail directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether a stored file with this name gets a thumbnail.
    pub fn applies_to(name: &str) -> bool {
        is_image(name)
    }

    /// Generate the thumbnail of `source` as `{dir}/{target_name}`.
    pub fn generate(&self, source: &Path, target_name: &str) -> bool {
        match self.try_generate(source, target_name) {
            Ok(()) => {
                tracing::debug!(file = %target_name, "Thumbnail created");
                true
            }
            Err(e) => {
                tracing::warn!(file = %target_name, error = %e, "Thumbnail creation failed");
                false
            }
        }
    }

    fn try_generate(&self, source: &Path, target_name: &str) -> Result<()> {
        let format = ImageFormat::from_extension(extension(target_name)).ok_or_else(|| {
            ShareError::Image(format!("unsupported thumbnail format: {target_name}"))
        })?;

        let img = ImageReader::open(source)?.with_guessed_format()?.decode()?;
        let thumb = self.shrink(img);

        // Encode next to the target and rename, so a failed encode leaves nothing behind.
        let temp = self.dir.join(format!(".thumb-{}.part", Uuid::new_v4()));
        let encoded = match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(thumb.to_rgb8()),
            _ => DynamicImage::ImageRgba8(thumb.to_rgba8()),
        }
        .save_with_format(&temp, format);

        if let Err(e) = encoded {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp, self.dir.join(target_name)) {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }
        Ok(())
    }

    /// Fit within the bounding box keeping the aspect ratio; never upscale.
    fn shrink(&self, img: DynamicImage) -> DynamicImage {
        if img.width() <= self.max_dimension && img.height() <= self.max_dimension {
            img
        } else {
            img.thumbnail(self.max_dimension, self.max_dimension)
        }
    }
}
