//! Response DTOs for Web API.

use serde::Serialize;
use utoipa::ToSchema;

use crate::file::{format_size, MediaKind, StoredFile};

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// One entry of the file listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileResponse {
    /// Stored filename.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Human-readable size, e.g. "1.5 MB".
    pub size_display: String,
    /// Lower-cased extension without the dot.
    pub extension: String,
    /// Media class: "image", "video" or "other".
    pub kind: MediaKind,
    /// Thumbnail URL, if a thumbnail exists.
    pub thumbnail_url: Option<String>,
    /// Forced-download URL.
    pub download_url: String,
    /// Range-aware streaming URL.
    pub stream_url: String,
}

impl From<StoredFile> for FileResponse {
    fn from(file: StoredFile) -> Self {
        let encoded = urlencoding::encode(&file.name).into_owned();
        Self {
            size_display: format_size(file.size),
            extension: file.extension,
            kind: file.kind,
            thumbnail_url: file
                .has_thumbnail
                .then(|| format!("/thumbnail/{encoded}")),
            download_url: format!("/download/{encoded}"),
            stream_url: format!("/stream/{encoded}"),
            name: file.name,
            size: file.size,
        }
    }
}
