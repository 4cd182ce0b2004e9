//! File service for sharefolder.
//!
//! Composes the store and the thumbnail generator for uploads. Thumbnailing
//! runs after the file is committed and never affects the upload result.

use bytes::Bytes;
use futures::Stream;

use super::storage::{FileStore, StoredFile};
use super::thumbnail::ThumbnailGenerator;
use crate::config::FilesConfig;
use crate::Result;

/// Result of an upload.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    /// The committed file.
    pub file: StoredFile,
    /// Whether a thumbnail was generated by this upload.
    pub thumbnail_created: bool,
}

/// File service for managing uploads into the shared folder.
#[derive(Debug, Clone)]
pub struct FileService {
    store: FileStore,
    thumbnails: ThumbnailGenerator,
}

impl FileService {
    /// Create a new FileService.
    pub fn new(store: FileStore, thumbnails: ThumbnailGenerator) -> Self {
        Self { store, thumbnails }
    }

    /// Create the store and generator from configuration, creating both directories.
    pub fn from_config(config: &FilesConfig) -> Result<Self> {
        let store = FileStore::new(&config.storage_path, &config.thumbnail_path)?;
        let thumbnails = ThumbnailGenerator::new(&config.thumbnail_path)?
            .with_max_dimension(config.thumbnail_max_dimension);
        Ok(Self::new(store, thumbnails))
    }

    /// Get the underlying store.
    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Store `body` under `name` (or a free variant of it) and thumbnail it
    /// if it is an image.
    ///
    /// `name` must already be sanitized.
    pub async fn upload<S>(&self, name: &str, body: S) -> Result<UploadOutcome>
    where
        S: Stream<Item = Result<Bytes>>,
    {
        let mut file = self.store.save(name, body).await?;

        if !ThumbnailGenerator::applies_to(&file.name) {
            return Ok(UploadOutcome {
                file,
                thumbnail_created: false,
            });
        }

        let generator = self.thumbnails.clone();
        let source = self.store.storage_dir().join(&file.name);
        let target = file.name.clone();
        let thumbnail_created =
            match tokio::task::spawn_blocking(move || generator.generate(&source, &target)).await
            {
                Ok(created) => created,
                Err(e) => {
                    tracing::warn!(file = %file.name, error = %e, "Thumbnail task failed");
                    false
                }
            };

        file.has_thumbnail = self.store.thumbnail_path_for(&file.name).is_some();

        Ok(UploadOutcome {
            file,
            thumbnail_created,
        })
    }
}
