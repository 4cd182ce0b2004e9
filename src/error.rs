//! Error types for sharefolder.

use thiserror::Error;

/// Common error type for sharefolder.
#[derive(Error, Debug)]
pub enum ShareError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Image decode or encode error.
    #[error("image error: {0}")]
    Image(String),

    /// The upload body could not be read.
    #[error("upload error: {0}")]
    Upload(String),

    /// The upload body exceeded the configured size limit.
    #[error("upload exceeds the size limit")]
    PayloadTooLarge,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<image::ImageError> for ShareError {
    fn from(e: image::ImageError) -> Self {
        ShareError::Image(e.to_string())
    }
}

/// Result type alias for sharefolder operations.
pub type Result<T> = std::result::Result<T, ShareError>;
