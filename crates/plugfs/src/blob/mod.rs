//! Blob-store client boundary.
//!
//! `ObjectStorageAdapter` talks to a container through the `BlobStore` trait,
//! which models the handful of primitives a cloud blob client provides:
//! prefix listing, download, upload, delete and an existence check. A real
//! network client implements this trait; `MemoryBlobStore` is the in-process
//! implementation used for tests and embedding.
//!
//! Absence is reported natively as `BlobError::NotFound`. The adapter, not
//! the store, translates that into `BackendError::NotFound`.

mod memory;

pub use memory::{DEFAULT_SEGMENT_SIZE, MemoryBlobStore};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::adapter::ChunkStream;
use plugfs_types::BlobError;

/// One entry of a prefix listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobItem {
    /// Full blob key.
    pub name: String,
    /// Content length in bytes.
    pub size: u64,
}

/// Lazy stream of listing results, in the store's (lexicographic) order.
pub type BlobListing = BoxStream<'static, Result<BlobItem, BlobError>>;

/// An open download session.
///
/// The chunk stream owns the session; dropping it closes the download.
pub struct BlobDownload {
    /// Total content length.
    pub size: u64,
    /// Content in the store's native transfer segments.
    pub chunks: BoxStream<'static, Result<Bytes, BlobError>>,
}

impl std::fmt::Debug for BlobDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobDownload")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Primitive operations of a blob container client.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Identifier of the container this client is bound to.
    fn container(&self) -> &str;

    /// Enumerate every blob whose key starts with `prefix`.
    async fn list_blobs(&self, prefix: &str) -> Result<BlobListing, BlobError>;

    /// Open a download of the blob at `key`.
    async fn download(&self, key: &str) -> Result<BlobDownload, BlobError>;

    /// Upload `data` to `key`.
    ///
    /// Content becomes visible only after the whole stream has been
    /// committed. With `overwrite` false an existing blob is an error.
    async fn upload(&self, key: &str, data: ChunkStream, overwrite: bool) -> Result<u64, BlobError>;

    /// Delete the blob at `key`.
    async fn delete(&self, key: &str) -> Result<(), BlobError>;

    /// Check whether a blob exists at `key`.
    async fn exists(&self, key: &str) -> Result<bool, BlobError>;
}
