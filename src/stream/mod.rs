//! Range-aware delivery of stored files.
//!
//! [`plan`] decides between a full and a single-range partial response from
//! the `Range` header and the file's current size; [`open_chunks`] produces
//! the lazily-read body for either.

mod chunks;
mod range;

pub use chunks::{open_chunks, FileChunks};
pub use range::{plan, Delivery, RangeError, RangeSpec};

/// Content type sent for every stream response, whatever the container.
pub const STREAM_CONTENT_TYPE: &str = "video/mp4";

/// Default number of bytes read from disk per body chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;
