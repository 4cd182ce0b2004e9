//! Lazily-read file bodies.

use std::io::{self, SeekFrom};
use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, Take};
use tokio_util::io::ReaderStream;

use crate::{Result, ShareError};

/// Chunk stream over a byte window of an open file.
///
/// Ends after `length` bytes or at end of file, whichever comes first.
/// Dropping it (for example when the client disconnects) closes the file.
pub type FileChunks = ReaderStream<Take<File>>;

/// Open `path` and stream `length` bytes from `offset` in chunks of at most
/// `chunk_size` bytes.
pub async fn open_chunks(
    path: &Path,
    offset: u64,
    length: u64,
    chunk_size: usize,
) -> Result<FileChunks> {
    let mut file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ShareError::NotFound(format!("File: {}", path.display())));
        }
        Err(e) => return Err(e.into()),
    };

    if offset > 0 {
        file.seek(SeekFrom::Start(offset)).await?;
    }

    Ok(ReaderStream::with_capacity(
        file.take(length),
        chunk_size.max(1),
    ))
}
