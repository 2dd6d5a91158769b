//! Local disk adapter.
//!
//! Paths are native filesystem paths, used as given. The disk already has
//! real directories, so listing is a `read_dir` plus classification; writes
//! go through a staging file that is renamed over the target.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use futures::TryStreamExt;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use super::{Adapter, ChunkStream};
use crate::config::AdapterConfig;
use crate::item::{Directory, DirectoryListing, File, FilesystemItem};
use plugfs_types::{BackendError, BackendResult};

/// Adapter over the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct LocalAdapter {
    config: AdapterConfig,
}

impl LocalAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AdapterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Open a staging file beside `path` for an atomic replace.
    async fn stage(&self, path: &str) -> BackendResult<(StagedFile, fs::File)> {
        StagedFile::create(Path::new(path))
            .await
            .map_err(|e| absent_as(e, || BackendError::parent_not_found(path)))
    }

    /// Metadata of a regular file; directories count as missing files.
    async fn file_metadata(&self, path: &str) -> BackendResult<std::fs::Metadata> {
        let meta = fs::metadata(path)
            .await
            .map_err(|e| absent_as(e, || BackendError::file_not_found(path)))?;
        if meta.is_dir() {
            return Err(BackendError::file_not_found(path));
        }
        Ok(meta)
    }
}

/// Normalize the native "no such file" signal; other errors pass through.
fn absent_as(err: io::Error, not_found: impl FnOnce() -> BackendError) -> BackendError {
    if err.kind() == io::ErrorKind::NotFound {
        not_found()
    } else {
        BackendError::Io(err)
    }
}

/// Read the next fixed-size window; `None` at end of file.
async fn next_window(mut file: fs::File, window: usize) -> BackendResult<Option<(Bytes, fs::File)>> {
    let mut chunk = Vec::with_capacity(window);
    (&mut file).take(window as u64).read_to_end(&mut chunk).await?;
    if chunk.is_empty() {
        return Ok(None);
    }
    Ok(Some((Bytes::from(chunk), file)))
}

static STAGING_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A not-yet-visible sibling of the target file.
///
/// Removed on drop unless committed, so abandoned or failed writes leave
/// nothing behind. Drop is synchronous (std::fs), no task spawning.
struct StagedFile {
    staging: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl StagedFile {
    async fn create(target: &Path) -> io::Result<(Self, fs::File)> {
        let file_name = target
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid path"))?;
        let id = STAGING_COUNTER.fetch_add(1, Ordering::Relaxed);
        let staging_name = format!(
            ".{}.{}-{}.partial",
            file_name.to_string_lossy(),
            std::process::id(),
            id
        );
        let staging = match target.parent() {
            Some(parent) => parent.join(staging_name),
            None => PathBuf::from(staging_name),
        };

        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&staging)
            .await?;

        Ok((
            Self {
                staging,
                target: target.to_path_buf(),
                committed: false,
            },
            file,
        ))
    }

    /// Flush `file` and move the staged content over the target.
    async fn commit(mut self, mut file: fs::File) -> io::Result<()> {
        file.flush().await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&self.staging, &self.target).await?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.staging)
            && e.kind() != io::ErrorKind::NotFound
        {
            tracing::warn!(staging = %self.staging.display(), "failed to remove staging file: {}", e);
        }
    }
}

#[async_trait]
impl Adapter for LocalAdapter {
    // ═══════════════════════════════════════════════════════════════════════════
    // Directory Operations
    // ═══════════════════════════════════════════════════════════════════════════

    #[tracing::instrument(level = "debug", skip(self), fields(backend = "local"))]
    async fn list<'a>(&'a self, path: &str) -> BackendResult<DirectoryListing<'a>> {
        let dir = Path::new(path);
        let mut entries = fs::read_dir(dir)
            .await
            .map_err(|e| absent_as(e, || BackendError::listing_not_found(path)))?;

        let mut children = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let child = dir.join(entry.file_name());
            // Follow links like a stat would; a dangling link is classified as itself.
            let meta = match fs::metadata(&child).await {
                Ok(meta) => meta,
                Err(_) => entry.metadata().await?,
            };
            children.push((child.to_string_lossy().into_owned(), meta));
        }
        children.sort_by(|a, b| a.0.cmp(&b.0));

        let items: Vec<FilesystemItem<'a>> = children
            .into_iter()
            .map(|(child, meta)| {
                if meta.is_dir() {
                    FilesystemItem::from(Directory::new(child))
                } else {
                    FilesystemItem::from(File::new(child, self).with_size(meta.len()))
                }
            })
            .collect();

        tracing::debug!(entries = items.len(), "listed directory");
        Ok(DirectoryListing::new(items))
    }

    #[tracing::instrument(level = "debug", skip(self), fields(backend = "local"))]
    async fn makedirs(&self, path: &str) -> BackendResult<()> {
        fs::create_dir_all(path).await?;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // File Operations
    // ═══════════════════════════════════════════════════════════════════════════

    #[tracing::instrument(level = "debug", skip(self), fields(backend = "local"))]
    async fn read(&self, path: &str) -> BackendResult<Vec<u8>> {
        fs::read(path)
            .await
            .map_err(|e| absent_as(e, || BackendError::file_not_found(path)))
    }

    #[tracing::instrument(level = "debug", skip(self), fields(backend = "local"))]
    async fn get_iterator(&self, path: &str) -> BackendResult<ChunkStream> {
        let file = fs::File::open(path)
            .await
            .map_err(|e| absent_as(e, || BackendError::file_not_found(path)))?;
        if file.metadata().await?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {}", path),
            )
            .into());
        }

        let window = self.config.effective_chunk_size();
        Ok(stream::try_unfold(file, move |file| next_window(file, window)).boxed())
    }

    #[tracing::instrument(level = "debug", skip(self), fields(backend = "local"))]
    async fn get_file<'a>(&'a self, path: &str) -> BackendResult<File<'a>> {
        let meta = self.file_metadata(path).await?;
        Ok(File::new(path, self).with_size(meta.len()))
    }

    async fn size(&self, path: &str) -> BackendResult<u64> {
        Ok(self.file_metadata(path).await?.len())
    }

    #[tracing::instrument(level = "debug", skip(self, data), fields(backend = "local", len = data.len()), err)]
    async fn write<'a>(&'a self, path: &str, data: &[u8]) -> BackendResult<File<'a>> {
        let (staged, mut file) = self.stage(path).await?;
        file.write_all(data).await?;
        staged.commit(file).await?;
        Ok(File::new(path, self).with_size(data.len() as u64))
    }

    #[tracing::instrument(level = "debug", skip(self, chunks), fields(backend = "local"), err)]
    async fn write_iterator<'a>(
        &'a self,
        path: &str,
        mut chunks: ChunkStream,
    ) -> BackendResult<File<'a>> {
        let (staged, mut file) = self.stage(path).await?;
        let mut written = 0u64;
        while let Some(chunk) = chunks.try_next().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        staged.commit(file).await?;
        tracing::debug!(written, "streamed write committed");
        Ok(File::new(path, self).with_size(written))
    }

    #[tracing::instrument(level = "debug", skip(self), fields(backend = "local"))]
    async fn delete(&self, path: &str) -> BackendResult<()> {
        fs::remove_file(path)
            .await
            .map_err(|e| absent_as(e, || BackendError::delete_not_found(path)))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Backend Information
    // ═══════════════════════════════════════════════════════════════════════════

    fn backend_type(&self) -> &str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::collect_chunks;
    use tempfile::TempDir;

    fn setup() -> (LocalAdapter, TempDir) {
        (LocalAdapter::new(), TempDir::new().unwrap())
    }

    fn path_in(dir: &TempDir, name: &str) -> String {
        dir.path().join(name).to_string_lossy().into_owned()
    }

    /// Staging files left in `dir`, if any.
    fn leftovers(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".partial"))
            .collect()
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let (adapter, dir) = setup();
        let path = path_in(&dir, "test.txt");

        let file = adapter.write(&path, b"hello").await.unwrap();
        assert_eq!(file.path(), path);
        assert_eq!(file.size().await.unwrap(), 5);
        assert_eq!(adapter.read(&path).await.unwrap(), b"hello");
        assert!(leftovers(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_write_overwrites() {
        let (adapter, dir) = setup();
        let path = path_in(&dir, "test.txt");

        adapter.write(&path, b"first version").await.unwrap();
        adapter.write(&path, b"second").await.unwrap();
        assert_eq!(adapter.read(&path).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_write_missing_parent_is_not_found() {
        let (adapter, dir) = setup();
        let path = path_in(&dir, "no/such/dir/file.txt");

        let err = adapter.write(&path, b"data").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            format!("Failed to write file '{}', directory does not exist!", path)
        );
        assert!(!dir.path().join("no").exists());
    }

    #[tokio::test]
    async fn test_write_iterator_failure_leaves_no_trace() {
        let (adapter, dir) = setup();
        let path = path_in(&dir, "broken.bin");

        let chunks: ChunkStream = stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(BackendError::from(io::Error::other("source went away"))),
        ])
        .boxed();
        let err = adapter.write_iterator(&path, chunks).await.unwrap_err();
        assert!(matches!(err, BackendError::Io(_)));
        assert!(!Path::new(&path).exists());
        assert!(leftovers(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_get_iterator_windows() {
        let (_, dir) = setup();
        let adapter = LocalAdapter::with_config(AdapterConfig::default().with_chunk_size(4));
        let path = path_in(&dir, "ten.bin");
        adapter.write(&path, b"0123456789").await.unwrap();

        let chunks: Vec<Bytes> = adapter
            .get_iterator(&path)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        let sizes: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
    }

    #[tokio::test]
    async fn test_get_iterator_empty_file() {
        let (adapter, dir) = setup();
        let path = path_in(&dir, "empty");
        adapter.write(&path, b"").await.unwrap();

        let chunks = adapter.get_iterator(&path).await.unwrap();
        assert!(collect_chunks(chunks).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_iterator_missing_fails_eagerly() {
        let (adapter, dir) = setup();
        let path = path_in(&dir, "missing.bin");

        let err = adapter.get_iterator(&path).await.err().unwrap();
        assert_eq!(err.to_string(), format!("Failed to find file '{}'!", path));
    }

    #[tokio::test]
    async fn test_get_iterator_on_directory_fails_eagerly() {
        let (adapter, dir) = setup();
        let path = dir.path().to_string_lossy().into_owned();

        let err = adapter.get_iterator(&path).await.err().unwrap();
        assert!(matches!(err, BackendError::Io(ref e) if e.kind() == io::ErrorKind::IsADirectory));
    }

    #[tokio::test]
    async fn test_get_file_on_directory_is_not_found() {
        let (adapter, dir) = setup();
        let path = dir.path().to_string_lossy().into_owned();

        let err = adapter.get_file(&path).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_makedirs_is_idempotent() {
        let (adapter, dir) = setup();
        let path = path_in(&dir, "a/b/c");

        adapter.makedirs(&path).await.unwrap();
        adapter.makedirs(&path).await.unwrap();
        assert!(Path::new(&path).is_dir());
    }

    #[tokio::test]
    async fn test_delete() {
        let (adapter, dir) = setup();
        let path = path_in(&dir, "doomed.txt");
        adapter.write(&path, b"bye").await.unwrap();

        adapter.delete(&path).await.unwrap();
        let err = adapter.delete(&path).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Failed to delete file '{}', file does not exist!", path)
        );
    }

    #[tokio::test]
    async fn test_list_trailing_slash_equivalent() {
        let (adapter, dir) = setup();
        adapter.write(&path_in(&dir, "b.txt"), b"b").await.unwrap();
        adapter.write(&path_in(&dir, "a.txt"), b"a").await.unwrap();
        adapter.makedirs(&path_in(&dir, "sub")).await.unwrap();

        let base = dir.path().to_string_lossy().into_owned();
        let plain: Vec<String> = adapter
            .list(&base)
            .await
            .unwrap()
            .iter()
            .map(|i| i.path().to_string())
            .collect();
        let slashed: Vec<String> = adapter
            .list(&format!("{}/", base))
            .await
            .unwrap()
            .iter()
            .map(|i| i.path().to_string())
            .collect();

        assert_eq!(plain, slashed);
        assert_eq!(
            plain,
            vec![path_in(&dir, "a.txt"), path_in(&dir, "b.txt"), path_in(&dir, "sub")]
        );
    }

    #[tokio::test]
    async fn test_backend_type() {
        assert_eq!(LocalAdapter::new().backend_type(), "local");
    }
}
