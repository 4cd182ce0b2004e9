//! API handlers for the shared folder.

pub mod files;
pub mod stream;

pub use files::*;
pub use stream::*;

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::FilesConfig;
use crate::file::FileService;
use crate::stream::DEFAULT_CHUNK_SIZE;
use crate::Result;

use super::error::ApiError;

/// Application state shared by all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Upload service and the store behind it.
    pub files: FileService,
    /// Bytes read from disk per body chunk.
    pub chunk_size: usize,
    /// Maximum upload size in bytes.
    pub max_upload_size: u64,
    /// Limits concurrent stream bodies when set.
    stream_permits: Option<Arc<Semaphore>>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(files: FileService) -> Self {
        Self {
            files,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_upload_size: FilesConfig::default().max_upload_bytes(),
            stream_permits: None,
        }
    }

    /// Build the state from configuration, creating the directories.
    pub fn from_config(config: &FilesConfig) -> Result<Self> {
        let files = FileService::from_config(config)?;
        Ok(Self::new(files)
            .with_chunk_size(config.stream_chunk_size)
            .with_max_upload_size(config.max_upload_bytes())
            .with_stream_limit(config.max_concurrent_streams))
    }

    /// Set the streaming chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set the maximum upload size in bytes.
    pub fn with_max_upload_size(mut self, bytes: u64) -> Self {
        self.max_upload_size = bytes;
        self
    }

    /// Bound the number of simultaneous stream bodies (0 = unlimited).
    pub fn with_stream_limit(mut self, max_streams: usize) -> Self {
        self.stream_permits = (max_streams > 0).then(|| Arc::new(Semaphore::new(max_streams)));
        self
    }

    /// Take a stream permit, or `None` when streams are unlimited.
    pub fn acquire_stream_permit(&self) -> std::result::Result<Option<OwnedSemaphorePermit>, ApiError> {
        match &self.stream_permits {
            None => Ok(None),
            Some(permits) => permits.clone().try_acquire_owned().map(Some).map_err(|_| {
                tracing::warn!("Stream limit reached");
                ApiError::unavailable("Too many concurrent streams")
            }),
        }
    }
}
