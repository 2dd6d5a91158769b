//! Object storage adapter.
//!
//! A blob container has no directories, only keys. `list` rebuilds one level
//! of hierarchy from the keys under a prefix: keys with no further separator
//! are files, everything else is folded into one pseudo-directory per first
//! segment. Because nothing marks an empty directory, a prefix with no keys
//! lists as empty rather than failing.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use futures::TryStreamExt;

use super::{collect_chunks, Adapter, ChunkStream};
use crate::blob::BlobStore;
use crate::item::{Directory, DirectoryListing, File, FilesystemItem};
use plugfs_types::{classify_key, listing_prefix, BackendError, BackendResult, BlobError, KeyChild};

/// Adapter over a flat blob container.
pub struct ObjectStorageAdapter {
    store: Arc<dyn BlobStore>,
}

impl ObjectStorageAdapter {
    /// Create an adapter over a connected container client.
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Get the underlying container client.
    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }

    /// Upload a chunk stream, replacing whatever is at `path`.
    ///
    /// The store only reports that the source failed; the original error is
    /// kept aside and returned in its place.
    async fn upload<'a>(&'a self, path: &str, chunks: ChunkStream) -> BackendResult<File<'a>> {
        let source_error: Arc<Mutex<Option<BackendError>>> = Arc::default();
        let slot = Arc::clone(&source_error);
        let data = chunks
            .map_err(move |e| {
                let aborted = BackendError::Blob(BlobError::Aborted(e.to_string()));
                if let Ok(mut slot) = slot.lock() {
                    slot.get_or_insert(e);
                }
                aborted
            })
            .boxed();

        match self.store.upload(path, data, true).await {
            Ok(size) => Ok(File::new(path, self).with_size(size)),
            Err(err) => {
                let source = source_error.lock().ok().and_then(|mut slot| slot.take());
                Err(source.unwrap_or(BackendError::Blob(err)))
            }
        }
    }
}

/// Normalize the store's native "no such blob" signal; other errors pass through.
fn absent_as(err: BlobError, not_found: impl FnOnce() -> BackendError) -> BackendError {
    match err {
        BlobError::NotFound(_) => not_found(),
        other => BackendError::Blob(other),
    }
}

#[async_trait]
impl Adapter for ObjectStorageAdapter {
    // ═══════════════════════════════════════════════════════════════════════════
    // Directory Operations
    // ═══════════════════════════════════════════════════════════════════════════

    #[tracing::instrument(level = "debug", skip(self), fields(backend = "object"))]
    async fn list<'a>(&'a self, path: &str) -> BackendResult<DirectoryListing<'a>> {
        let prefix = listing_prefix(path);
        let mut blobs = self.store.list_blobs(&prefix).await?;

        let mut seen = HashSet::new();
        let mut items = Vec::new();
        while let Some(blob) = blobs.try_next().await? {
            match classify_key(&prefix, &blob.name) {
                Some(KeyChild::File(key)) => {
                    items.push(FilesystemItem::from(File::new(key, self).with_size(blob.size)));
                }
                Some(KeyChild::Directory(dir)) => {
                    if seen.insert(dir.clone()) {
                        items.push(FilesystemItem::from(Directory::new(dir)));
                    }
                }
                None => {}
            }
        }

        tracing::debug!(
            container = self.store.container(),
            %prefix,
            entries = items.len(),
            directories = seen.len(),
            "synthesized listing"
        );
        Ok(DirectoryListing::new(items))
    }

    /// Containers have no directory objects; key prefixes come into being
    /// with the first write below them.
    async fn makedirs(&self, _path: &str) -> BackendResult<()> {
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // File Operations
    // ═══════════════════════════════════════════════════════════════════════════

    #[tracing::instrument(level = "debug", skip(self), fields(backend = "object"))]
    async fn read(&self, path: &str) -> BackendResult<Vec<u8>> {
        let chunks = self.get_iterator(path).await?;
        collect_chunks(chunks).await
    }

    #[tracing::instrument(level = "debug", skip(self), fields(backend = "object"))]
    async fn get_iterator(&self, path: &str) -> BackendResult<ChunkStream> {
        let download = self
            .store
            .download(path)
            .await
            .map_err(|e| absent_as(e, || BackendError::file_not_found(path)))?;
        Ok(download.chunks.map_err(BackendError::from).boxed())
    }

    #[tracing::instrument(level = "debug", skip(self), fields(backend = "object"))]
    async fn get_file<'a>(&'a self, path: &str) -> BackendResult<File<'a>> {
        if self.store.exists(path).await? {
            Ok(File::new(path, self))
        } else {
            Err(BackendError::file_not_found(path))
        }
    }

    async fn size(&self, path: &str) -> BackendResult<u64> {
        // No HEAD primitive: open a download for its length and drop it unread.
        let download = self
            .store
            .download(path)
            .await
            .map_err(|e| absent_as(e, || BackendError::file_not_found(path)))?;
        Ok(download.size)
    }

    #[tracing::instrument(level = "debug", skip(self, data), fields(backend = "object", len = data.len()), err)]
    async fn write<'a>(&'a self, path: &str, data: &[u8]) -> BackendResult<File<'a>> {
        let single: ChunkStream = stream::iter([Ok(Bytes::copy_from_slice(data))]).boxed();
        self.upload(path, single).await
    }

    #[tracing::instrument(level = "debug", skip(self, chunks), fields(backend = "object"), err)]
    async fn write_iterator<'a>(
        &'a self,
        path: &str,
        chunks: ChunkStream,
    ) -> BackendResult<File<'a>> {
        self.upload(path, chunks).await
    }

    #[tracing::instrument(level = "debug", skip(self), fields(backend = "object"))]
    async fn delete(&self, path: &str) -> BackendResult<()> {
        self.store
            .delete(path)
            .await
            .map_err(|e| absent_as(e, || BackendError::delete_not_found(path)))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Backend Information
    // ═══════════════════════════════════════════════════════════════════════════

    fn backend_type(&self) -> &str {
        "object"
    }
}

impl std::fmt::Debug for ObjectStorageAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStorageAdapter")
            .field("container", &self.store.container())
            .finish()
    }
}
