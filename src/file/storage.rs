//! Directory-backed file store for sharefolder.
//!
//! The storage directory is the only source of truth: every listing and
//! lookup is re-derived from the filesystem.
//!
//! ```text
//! {storage_dir}/
//! ├── video.mp4
//! ├── video(1).mp4
//! └── cat.png
//! {thumbnail_dir}/
//! └── cat.png
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::{pin_mut, Stream, StreamExt};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;

use super::media::{extension, is_visible, MediaKind};
use super::naming::{candidates, is_plain_name};
use crate::{Result, ShareError};

/// Metadata of one file in the storage directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Filename, unique within the storage directory.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Lower-cased extension without the dot.
    pub extension: String,
    /// Media class derived from the extension.
    pub kind: MediaKind,
    /// Whether a thumbnail exists for this file.
    pub has_thumbnail: bool,
}

/// The shared folder and its thumbnail namespace.
#[derive(Debug, Clone)]
pub struct FileStore {
    storage_dir: PathBuf,
    thumbnail_dir: PathBuf,
}

impl FileStore {
    /// Create a store over the two directories, creating them if absent.
    pub fn new(storage_dir: impl Into<PathBuf>, thumbnail_dir: impl Into<PathBuf>) -> Result<Self> {
        let storage_dir = storage_dir.into();
        let thumbnail_dir = thumbnail_dir.into();
        fs::create_dir_all(&storage_dir)?;
        fs::create_dir_all(&thumbnail_dir)?;

        Ok(Self {
            storage_dir,
            thumbnail_dir,
        })
    }

    /// Get the storage directory.
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Get the thumbnail directory.
    pub fn thumbnail_dir(&self) -> &Path {
        &self.thumbnail_dir
    }

    /// List visible regular files in filesystem order.
    pub fn list(&self) -> Result<Vec<StoredFile>> {
        self.list_with(is_visible)
    }

    /// List regular files whose name passes `filter`, in filesystem order.
    ///
    /// Entries that vanish or cannot be read while listing are skipped.
    pub fn list_with<F>(&self, filter: F) -> Result<Vec<StoredFile>>
    where
        F: Fn(&str) -> bool,
    {
        let mut files = Vec::new();

        for entry in fs::read_dir(&self.storage_dir)?.flatten() {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !filter(&name) {
                continue;
            }
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            files.push(self.describe(name, metadata.len()));
        }

        Ok(files)
    }

    /// Look up a file by name.
    ///
    /// Returns `None` if the file is absent or `name` is not a plain visible name.
    pub fn stat(&self, name: &str) -> Result<Option<StoredFile>> {
        let Some(path) = self.file_path(name) else {
            return Ok(None);
        };

        match fs::metadata(&path) {
            Ok(m) if m.is_file() => Ok(Some(self.describe(name.to_string(), m.len()))),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Path of `name` inside the storage directory, if `name` is addressable.
    pub fn file_path(&self, name: &str) -> Option<PathBuf> {
        is_plain_name(name).then(|| self.storage_dir.join(name))
    }

    /// Path of the thumbnail for `name`, if one exists.
    pub fn thumbnail_path_for(&self, name: &str) -> Option<PathBuf> {
        if !is_plain_name(name) {
            return None;
        }
        let path = self.thumbnail_dir.join(name);
        path.is_file().then_some(path)
    }

    /// Persist `body` under `name`, or under the next free `name(n)` variant.
    ///
    /// The body is first written to a hidden temporary file that is deleted
    /// when dropped, including when the upload future is cancelled. The final
    /// name is then reserved with exclusive create, so concurrent saves of the
    /// same name always end up under distinct names, and the temporary file is
    /// moved onto it. A failed or abandoned body leaves nothing in the directory.
    pub async fn save<S>(&self, name: &str, body: S) -> Result<StoredFile>
    where
        S: Stream<Item = Result<Bytes>>,
    {
        if !is_plain_name(name) {
            return Err(ShareError::Validation(format!("invalid filename: {name:?}")));
        }

        let temp = tempfile::Builder::new()
            .prefix(".upload-")
            .suffix(".part")
            .tempfile_in(&self.storage_dir)?;
        let (file, temp) = temp.into_parts();
        let size = write_stream(tokio::fs::File::from_std(file), body).await?;

        let stored_name = self.commit(temp, name).await?;
        tracing::info!(file = %stored_name, size, "File stored");
        Ok(self.describe(stored_name, size))
    }

    /// Reserve the first free candidate and move `temp` onto it.
    ///
    /// A thumbnail left over from an earlier file of the same name is removed
    /// once the name is reserved.
    async fn commit(&self, temp: TempPath, name: &str) -> Result<String> {
        for candidate in candidates(name) {
            let target = self.storage_dir.join(&candidate);
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&target)
                .await
            {
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }

            match tokio::fs::remove_file(self.thumbnail_dir.join(&candidate)).await {
                Ok(()) => tracing::debug!(file = %candidate, "Removed stale thumbnail"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    let _ = tokio::fs::remove_file(&target).await;
                    return Err(e.into());
                }
            }

            if let Err(e) = temp.persist(&target) {
                let _ = tokio::fs::remove_file(&target).await;
                return Err(e.error.into());
            }
            return Ok(candidate);
        }

        Err(ShareError::Validation(format!("no free name for {name:?}")))
    }

    fn describe(&self, name: String, size: u64) -> StoredFile {
        let has_thumbnail = self.thumbnail_dir.join(&name).is_file();
        StoredFile {
            extension: extension(&name),
            kind: MediaKind::from_name(&name),
            has_thumbnail,
            name,
            size,
        }
    }
}

async fn write_stream<S>(mut file: tokio::fs::File, body: S) -> Result<u64>
where
    S: Stream<Item = Result<Bytes>>,
{
    let mut written = 0u64;

    pin_mut!(body);
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use tempfile::TempDir;

    fn setup_store() -> (TempDir, FileStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(
            temp_dir.path().join("Shared Files"),
            temp_dir.path().join("thumbnails"),
        )
        .unwrap();
        (temp_dir, store)
    }

    fn body(parts: &[&[u8]]) -> impl Stream<Item = Result<Bytes>> {
        let chunks: Vec<Result<Bytes>> = parts
            .iter()
            .map(|p| Ok(Bytes::copy_from_slice(p)))
            .collect();
        stream::iter(chunks)
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_new_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let storage = temp_dir.path().join("a/files");
        let thumbs = temp_dir.path().join("a/thumbs");

        let store = FileStore::new(&storage, &thumbs).unwrap();

        assert!(storage.is_dir());
        assert!(thumbs.is_dir());
        assert_eq!(store.storage_dir(), storage);
        assert_eq!(store.thumbnail_dir(), thumbs);

        // Idempotent
        FileStore::new(&storage, &thumbs).unwrap();
    }

    #[tokio::test]
    async fn test_save_and_stat() {
        let (_temp, store) = setup_store();

        let stored = store
            .save("video.mp4", body(&[b"hello ", b"world"]))
            .await
            .unwrap();

        assert_eq!(stored.name, "video.mp4");
        assert_eq!(stored.size, 11);
        assert_eq!(stored.extension, "mp4");
        assert_eq!(stored.kind, MediaKind::Video);
        assert!(!stored.has_thumbnail);

        let on_disk = fs::read(store.storage_dir().join("video.mp4")).unwrap();
        assert_eq!(on_disk, b"hello world");

        assert_eq!(store.stat("video.mp4").unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn test_save_same_name_twice() {
        let (_temp, store) = setup_store();

        let first = store.save("video.mp4", body(&[b"one"])).await.unwrap();
        let second = store.save("video.mp4", body(&[b"two"])).await.unwrap();

        assert_eq!(first.name, "video.mp4");
        assert_eq!(second.name, "video(1).mp4");
        assert_eq!(fs::read(store.storage_dir().join("video.mp4")).unwrap(), b"one");
        assert_eq!(
            fs::read(store.storage_dir().join("video(1).mp4")).unwrap(),
            b"two"
        );
    }

    #[tokio::test]
    async fn test_concurrent_saves_get_distinct_names() {
        let (_temp, store) = setup_store();

        let mut handles = Vec::new();
        for i in 0..8u8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let data = vec![i; 64];
                store.save("clip.mp4", body(&[&data[..]])).await.unwrap()
            }));
        }

        let mut names = Vec::new();
        for handle in handles {
            names.push(handle.await.unwrap().name);
        }
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 8);

        // Every upload kept its own content.
        let mut firsts: Vec<u8> = names
            .iter()
            .map(|n| fs::read(store.storage_dir().join(n)).unwrap()[0])
            .collect();
        firsts.sort();
        assert_eq!(firsts, (0..8).collect::<Vec<u8>>());
    }

    #[tokio::test]
    async fn test_save_failed_body_leaves_nothing() {
        let (_temp, store) = setup_store();

        let chunks: Vec<Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"partial")),
            Err(ShareError::Upload("connection reset".to_string())),
        ];
        let result = store.save("video.mp4", stream::iter(chunks)).await;

        assert!(matches!(result, Err(ShareError::Upload(_))));
        assert!(dir_entries(store.storage_dir()).is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_save_leaves_nothing() {
        let (_temp, store) = setup_store();

        let chunks = stream::iter(vec![Ok(Bytes::from_static(b"partial"))]).chain(stream::pending());
        let result = tokio::time::timeout(
            std::time::Duration::from_millis(100),
            store.save("video.mp4", chunks),
        )
        .await;

        assert!(result.is_err());
        assert!(dir_entries(store.storage_dir()).is_empty());
    }

    #[tokio::test]
    async fn test_save_clears_stale_thumbnail() {
        let (_temp, store) = setup_store();
        fs::write(store.thumbnail_dir().join("cat.png"), b"old thumb").unwrap();

        let stored = store.save("cat.png", body(&[b"new"])).await.unwrap();

        assert_eq!(stored.name, "cat.png");
        assert!(!stored.has_thumbnail);
        assert!(store.thumbnail_path_for("cat.png").is_none());
    }

    #[tokio::test]
    async fn test_save_keeps_thumbnail_of_existing_file() {
        let (_temp, store) = setup_store();
        fs::write(store.storage_dir().join("cat.png"), b"png").unwrap();
        fs::write(store.thumbnail_dir().join("cat.png"), b"thumb").unwrap();

        let stored = store.save("cat.png", body(&[b"other"])).await.unwrap();

        assert_eq!(stored.name, "cat(1).png");
        assert!(store.thumbnail_path_for("cat.png").is_some());
    }

    #[tokio::test]
    async fn test_save_long_name_with_suffix() {
        let (_temp, store) = setup_store();
        let name = format!("{}.mp4", "a".repeat(251));

        let first = store.save(&name, body(&[b"one"])).await.unwrap();
        let second = store.save(&name, body(&[b"two"])).await.unwrap();

        assert_eq!(first.name, name);
        assert!(second.name.len() <= 255);
        assert!(second.name.ends_with("(1).mp4"));
        assert_eq!(fs::read(store.storage_dir().join(&second.name)).unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_save_rejects_unsafe_name() {
        let (_temp, store) = setup_store();

        let result = store.save("../escape.txt", body(&[b"x"])).await;
        assert!(matches!(result, Err(ShareError::Validation(_))));

        let result = store.save(".hidden", body(&[b"x"])).await;
        assert!(matches!(result, Err(ShareError::Validation(_))));
    }

    #[tokio::test]
    async fn test_save_empty_body() {
        let (_temp, store) = setup_store();

        let stored = store.save("empty.txt", body(&[])).await.unwrap();
        assert_eq!(stored.size, 0);
        assert!(store.storage_dir().join("empty.txt").is_file());
    }

    #[test]
    fn test_list_skips_hidden_and_directories() {
        let (_temp, store) = setup_store();
        fs::write(store.storage_dir().join("a.txt"), b"aaa").unwrap();
        fs::write(store.storage_dir().join(".DS_Store"), b"x").unwrap();
        fs::write(store.storage_dir().join(".secret"), b"x").unwrap();
        fs::create_dir(store.storage_dir().join("subdir")).unwrap();

        let files = store.list().unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "a.txt");
        assert_eq!(files[0].size, 3);
    }

    #[test]
    fn test_list_with_custom_predicate() {
        let (_temp, store) = setup_store();
        fs::write(store.storage_dir().join("a.mp4"), b"").unwrap();
        fs::write(store.storage_dir().join("b.txt"), b"").unwrap();

        let files = store.list_with(|name| name.ends_with(".mp4")).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].kind, MediaKind::Video);
    }

    #[test]
    fn test_list_reports_thumbnails() {
        let (_temp, store) = setup_store();
        fs::write(store.storage_dir().join("cat.png"), b"png").unwrap();
        fs::write(store.storage_dir().join("dog.png"), b"png").unwrap();
        fs::write(store.thumbnail_dir().join("cat.png"), b"thumb").unwrap();

        let mut files = store.list().unwrap();
        files.sort_by(|a, b| a.name.cmp(&b.name));

        assert!(files[0].has_thumbnail);
        assert!(!files[1].has_thumbnail);
    }

    #[test]
    fn test_stat_missing_and_invalid() {
        let (_temp, store) = setup_store();
        fs::write(store.storage_dir().join(".hidden"), b"x").unwrap();
        fs::create_dir(store.storage_dir().join("dir")).unwrap();

        assert_eq!(store.stat("nonexistent.mp4").unwrap(), None);
        assert_eq!(store.stat(".hidden").unwrap(), None);
        assert_eq!(store.stat("dir").unwrap(), None);
        assert_eq!(store.stat("../Shared Files").unwrap(), None);
    }

    #[test]
    fn test_thumbnail_path_for() {
        let (_temp, store) = setup_store();
        fs::write(store.thumbnail_dir().join("cat.png"), b"thumb").unwrap();

        assert_eq!(
            store.thumbnail_path_for("cat.png"),
            Some(store.thumbnail_dir().join("cat.png"))
        );
        assert_eq!(store.thumbnail_path_for("dog.png"), None);
        assert_eq!(store.thumbnail_path_for("../thumbnails/cat.png"), None);
    }

    #[test]
    fn test_file_path() {
        let (_temp, store) = setup_store();

        assert_eq!(
            store.file_path("a.txt"),
            Some(store.storage_dir().join("a.txt"))
        );
        assert_eq!(store.file_path(".."), None);
    }
}
