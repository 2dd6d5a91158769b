//! The `Adapter` trait: one contract over every storage backend.
//!
//! Two implementations are provided:
//!
//! - `LocalAdapter`: a real hierarchical store on local disk
//! - `ObjectStorageAdapter`: a flat blob namespace with synthesized directories
//!
//! # Architecture
//!
//! ```text
//! caller
//!     ↓
//! Filesystem (facade, owns one Box<dyn Adapter>)
//!     ↓
//! ┌──────────────────────────────────────────────────┐
//! │  LocalAdapter         │  ObjectStorageAdapter    │
//! │  - tokio::fs          │  - Arc<dyn BlobStore>    │
//! │  - real directories   │  - pseudo-directories    │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! Every adapter maps its backend's native "does not exist" signal into
//! `BackendError::NotFound` at the failing call. Other failures pass through.

mod local;
mod object;

pub use local::LocalAdapter;
pub use object::ObjectStorageAdapter;

#[cfg(test)]
pub mod testing;

#[cfg(test)]
pub use testing::MockAdapter;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::item::{DirectoryListing, File};
use plugfs_types::BackendResult;

/// A finite, single-pass sequence of byte chunks.
///
/// The stream owns whatever backend resource feeds it (an open file, a
/// download session). Dropping it early releases that resource.
pub type ChunkStream = BoxStream<'static, BackendResult<Bytes>>;

/// Uniform storage contract implemented by every backend.
///
/// Paths are opaque backend-native strings. Adapters hold no per-path state,
/// so independent calls may run concurrently.
#[async_trait]
pub trait Adapter: Send + Sync {
    // ═══════════════════════════════════════════════════════════════════════════
    // Directory Operations
    // ═══════════════════════════════════════════════════════════════════════════

    /// List the immediate children of `path`.
    ///
    /// `"dir"` and `"dir/"` produce the same listing. Backends with real
    /// containers fail with `NotFound` for a missing directory; backends
    /// without them return an empty listing.
    async fn list<'a>(&'a self, path: &str) -> BackendResult<DirectoryListing<'a>>;

    /// Ensure the container hierarchy for `path` exists. Idempotent.
    async fn makedirs(&self, path: &str) -> BackendResult<()>;

    // ═══════════════════════════════════════════════════════════════════════════
    // File Operations
    // ═══════════════════════════════════════════════════════════════════════════

    /// Read the whole object at `path`.
    async fn read(&self, path: &str) -> BackendResult<Vec<u8>>;

    /// Stream the object at `path` in chunks.
    ///
    /// A missing object fails here, before any chunk is produced.
    async fn get_iterator(&self, path: &str) -> BackendResult<ChunkStream>;

    /// Resolve a handle to an existing object. Never creates anything.
    async fn get_file<'a>(&'a self, path: &str) -> BackendResult<File<'a>>;

    /// Size of the object at `path` in bytes.
    async fn size(&self, path: &str) -> BackendResult<u64>;

    /// Create or replace the object at `path`.
    ///
    /// Readers never observe partial content.
    async fn write<'a>(&'a self, path: &str, data: &[u8]) -> BackendResult<File<'a>>;

    /// Create or replace the object at `path` from a chunk stream.
    ///
    /// Ends in the same state as `write` of the concatenated chunks, without
    /// holding the whole content in the adapter.
    async fn write_iterator<'a>(
        &'a self,
        path: &str,
        chunks: ChunkStream,
    ) -> BackendResult<File<'a>>;

    /// Remove the object at `path`.
    async fn delete(&self, path: &str) -> BackendResult<()>;

    // ═══════════════════════════════════════════════════════════════════════════
    // Backend Information
    // ═══════════════════════════════════════════════════════════════════════════

    /// Returns the backend type identifier (e.g., "local", "object").
    fn backend_type(&self) -> &str;
}

/// Collect a chunk stream into one buffer.
pub async fn collect_chunks(mut chunks: ChunkStream) -> BackendResult<Vec<u8>> {
    use futures::TryStreamExt;

    let mut data = Vec::new();
    while let Some(chunk) = chunks.try_next().await? {
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}
