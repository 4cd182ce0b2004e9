//! File management module for sharefolder.
//!
//! This module provides the shared folder itself:
//! - Collision-safe naming of uploaded files
//! - Media classification and listing metadata
//! - Best-effort thumbnail generation for images
//! - The directory-backed file store and the upload service composing them

mod media;
mod naming;
mod service;
mod storage;
mod thumbnail;

pub use media::{extension, format_size, is_image, is_video, is_visible, MediaKind};
pub use naming::{candidates, is_plain_name, resolve, sanitize_filename, split_name};
pub use service::{FileService, UploadOutcome};
pub use storage::{FileStore, StoredFile};
pub use thumbnail::ThumbnailGenerator;

/// Extensions that get a generated thumbnail (lower-case, without dot).
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Extensions classified as video in listings (lower-case, without dot).
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "avi", "mov", "wmv", "flv", "webm", "mkv", "m4v", "3gp", "ogv", "ts", "m2ts", "mts",
    "vob", "asf", "rm", "rmvb", "divx", "xvid",
];

/// Default bounding box for thumbnails (pixels per side).
pub const DEFAULT_THUMBNAIL_MAX_DIMENSION: u32 = 120;
