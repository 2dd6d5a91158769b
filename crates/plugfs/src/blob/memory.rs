//! In-memory blob container.
//!
//! Behaves like a cloud container as far as `ObjectStorageAdapter` can tell:
//! flat keys, lexicographic prefix listing, staged uploads that become
//! visible only on commit, downloads in fixed transfer segments.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::stream::{self, StreamExt};
use futures::TryStreamExt;

use super::{BlobDownload, BlobItem, BlobListing, BlobStore};
use crate::adapter::ChunkStream;
use plugfs_types::BlobError;

/// Default download segment: 4 MiB.
pub const DEFAULT_SEGMENT_SIZE: usize = 4 * 1024 * 1024;

/// In-memory blob container.
///
/// Thread-safe via internal `RwLock`. All data is lost when dropped.
#[derive(Debug)]
pub struct MemoryBlobStore {
    container: String,
    blobs: RwLock<BTreeMap<String, Bytes>>,
    segment_size: usize,
    open_downloads: Arc<AtomicUsize>,
}

impl MemoryBlobStore {
    /// Create an empty container.
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            blobs: RwLock::new(BTreeMap::new()),
            segment_size: DEFAULT_SEGMENT_SIZE,
            open_downloads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set the transfer segment size used by downloads.
    pub fn with_segment_size(mut self, segment_size: usize) -> Self {
        self.segment_size = segment_size.max(1);
        self
    }

    /// Store a blob directly, replacing any existing one.
    pub fn insert(&self, key: impl Into<String>, data: impl Into<Bytes>) -> Result<(), BlobError> {
        self.blobs
            .write()
            .map_err(|_| poisoned())?
            .insert(key.into(), data.into());
        Ok(())
    }

    /// Number of download sessions whose chunk stream is still alive.
    pub fn open_downloads(&self) -> usize {
        self.open_downloads.load(Ordering::SeqCst)
    }

    /// Number of blobs in the container.
    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> BlobError {
    BlobError::Transport("lock poisoned".to_string())
}

/// Keeps the open-download count up while a chunk stream is alive.
struct DownloadSession(Arc<AtomicUsize>);

impl DownloadSession {
    fn open(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for DownloadSession {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn container(&self) -> &str {
        &self.container
    }

    async fn list_blobs(&self, prefix: &str) -> Result<BlobListing, BlobError> {
        let blobs = self.blobs.read().map_err(|_| poisoned())?;
        let items: Vec<Result<BlobItem, BlobError>> = blobs
            .range(prefix.to_string()..)
            .take_while(|(name, _)| name.starts_with(prefix))
            .map(|(name, data)| {
                Ok(BlobItem {
                    name: name.clone(),
                    size: data.len() as u64,
                })
            })
            .collect();
        Ok(stream::iter(items).boxed())
    }

    async fn download(&self, key: &str) -> Result<BlobDownload, BlobError> {
        let data = self
            .blobs
            .read()
            .map_err(|_| poisoned())?
            .get(key)
            .cloned()
            .ok_or_else(|| BlobError::NotFound(key.to_string()))?;

        let segment = self.segment_size;
        let segments: Vec<Bytes> = (0..data.len())
            .step_by(segment)
            .map(|start| data.slice(start..(start + segment).min(data.len())))
            .collect();

        let session = DownloadSession::open(self.open_downloads.clone());
        let chunks = stream::iter(segments)
            .map(move |segment| {
                let _session = &session;
                Ok::<_, BlobError>(segment)
            })
            .boxed();

        Ok(BlobDownload {
            size: data.len() as u64,
            chunks,
        })
    }

    async fn upload(
        &self,
        key: &str,
        mut data: ChunkStream,
        overwrite: bool,
    ) -> Result<u64, BlobError> {
        // Stage blocks first; nothing is visible until commit.
        let mut staged = BytesMut::new();
        while let Some(block) = data
            .try_next()
            .await
            .map_err(|e| BlobError::Aborted(e.to_string()))?
        {
            staged.extend_from_slice(&block);
        }

        let mut blobs = self.blobs.write().map_err(|_| poisoned())?;
        if !overwrite && blobs.contains_key(key) {
            return Err(BlobError::AlreadyExists(key.to_string()));
        }
        let size = staged.len() as u64;
        blobs.insert(key.to_string(), staged.freeze());
        Ok(size)
    }

    async fn delete(&self, key: &str) -> Result<(), BlobError> {
        self.blobs
            .write()
            .map_err(|_| poisoned())?
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| BlobError::NotFound(key.to_string()))
    }

    async fn exists(&self, key: &str) -> Result<bool, BlobError> {
        Ok(self.blobs.read().map_err(|_| poisoned())?.contains_key(key))
    }
}
