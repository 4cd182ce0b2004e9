//! Media classification and display helpers.

use std::path::Path;

use serde::Serialize;
use utoipa::ToSchema;

use super::{IMAGE_EXTENSIONS, VIDEO_EXTENSIONS};

/// Media class of a stored file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// png, jpg, jpeg or gif.
    Image,
    /// One of the known video container extensions.
    Video,
    /// Anything else.
    Other,
}

impl MediaKind {
    /// Classify a filename by its extension (case-insensitive).
    pub fn from_name(name: &str) -> Self {
        if is_image(name) {
            MediaKind::Image
        } else if is_video(name) {
            MediaKind::Video
        } else {
            MediaKind::Other
        }
    }

    /// Lower-case label used in listings.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Other => "other",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower-cased extension of `name` without the dot, or an empty string.
///
/// Dot files such as `.bashrc` have no extension.
pub fn extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default()
}

/// Whether `name` has a thumbnail-able image extension.
pub fn is_image(name: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&extension(name).as_str())
}

/// Whether `name` has a known video extension.
///
/// Advisory only; streaming does not depend on it.
pub fn is_video(name: &str) -> bool {
    VIDEO_EXTENSIONS.contains(&extension(name).as_str())
}

/// Listing predicate: hidden entries (leading `.`, including `.DS_Store`) are skipped.
pub fn is_visible(name: &str) -> bool {
    !name.starts_with('.')
}

/// Format a byte count for display, e.g. `1536` -> `1.5 KB`.
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{size:.1} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1} TB")
}
