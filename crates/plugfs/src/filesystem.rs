//! The `Filesystem` facade.
//!
//! Holds exactly one adapter, chosen at construction, and forwards every call
//! to it unchanged. Callers written against `Filesystem` do not care whether
//! the bytes live on local disk or in a blob container.

use std::fmt;

use crate::adapter::{Adapter, ChunkStream};
use crate::item::{DirectoryListing, File};
use plugfs_types::BackendResult;

/// Backend-agnostic entry point.
pub struct Filesystem {
    adapter: Box<dyn Adapter>,
}

impl Filesystem {
    pub fn new(adapter: impl Adapter + 'static) -> Self {
        Self {
            adapter: Box::new(adapter),
        }
    }

    pub fn from_boxed(adapter: Box<dyn Adapter>) -> Self {
        Self { adapter }
    }

    /// The configured adapter.
    pub fn adapter(&self) -> &dyn Adapter {
        self.adapter.as_ref()
    }

    pub async fn list(&self, path: &str) -> BackendResult<DirectoryListing<'_>> {
        self.adapter.list(path).await
    }

    pub async fn makedirs(&self, path: &str) -> BackendResult<()> {
        self.adapter.makedirs(path).await
    }

    pub async fn read(&self, path: &str) -> BackendResult<Vec<u8>> {
        self.adapter.read(path).await
    }

    pub async fn get_iterator(&self, path: &str) -> BackendResult<ChunkStream> {
        self.adapter.get_iterator(path).await
    }

    pub async fn get_file(&self, path: &str) -> BackendResult<File<'_>> {
        self.adapter.get_file(path).await
    }

    pub async fn size(&self, path: &str) -> BackendResult<u64> {
        self.adapter.size(path).await
    }

    pub async fn write(&self, path: &str, data: &[u8]) -> BackendResult<File<'_>> {
        self.adapter.write(path, data).await
    }

    pub async fn write_iterator(&self, path: &str, chunks: ChunkStream) -> BackendResult<File<'_>> {
        self.adapter.write_iterator(path, chunks).await
    }

    pub async fn delete(&self, path: &str) -> BackendResult<()> {
        self.adapter.delete(path).await
    }
}

impl fmt::Debug for Filesystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filesystem")
            .field("backend", &self.adapter.backend_type())
            .finish()
    }
}
