//! Test utilities for the adapter module.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};

use super::{Adapter, ChunkStream};
use crate::item::{Directory, DirectoryListing, File, FilesystemItem};
use plugfs_types::BackendResult;

/// Mock adapter that counts invocations and remembers the last path.
/// Used to verify that handles and the facade route through the adapter.
pub struct MockAdapter {
    pub call_count: Arc<AtomicUsize>,
    last_path: Mutex<Option<String>>,
}

impl MockAdapter {
    /// Size reported by `size()`.
    pub const SIZE: u64 = 7;

    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        (
            Self {
                call_count: count.clone(),
                last_path: Mutex::new(None),
            },
            count,
        )
    }

    /// Get the current call count.
    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn last_path(&self) -> Option<String> {
        self.last_path.lock().ok().and_then(|p| p.clone())
    }

    fn record(&self, path: &str) {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_path.lock() {
            *last = Some(path.to_string());
        }
    }
}

impl Default for MockAdapter {
    fn default() -> Self {
        Self::new().0
    }
}

#[async_trait]
impl Adapter for MockAdapter {
    async fn list<'a>(&'a self, path: &str) -> BackendResult<DirectoryListing<'a>> {
        self.record(path);
        Ok(DirectoryListing::new(vec![
            FilesystemItem::from(File::new(format!("{}/mock.bin", path), self)),
            FilesystemItem::from(Directory::new(format!("{}/mock", path))),
        ]))
    }

    async fn makedirs(&self, path: &str) -> BackendResult<()> {
        self.record(path);
        Ok(())
    }

    async fn read(&self, path: &str) -> BackendResult<Vec<u8>> {
        self.record(path);
        Ok(b"mock".to_vec())
    }

    async fn get_iterator(&self, path: &str) -> BackendResult<ChunkStream> {
        self.record(path);
        Ok(stream::iter(vec![Ok(Bytes::from_static(b"mock"))]).boxed())
    }

    async fn get_file<'a>(&'a self, path: &str) -> BackendResult<File<'a>> {
        self.record(path);
        Ok(File::new(path, self))
    }

    async fn size(&self, path: &str) -> BackendResult<u64> {
        self.record(path);
        Ok(Self::SIZE)
    }

    async fn write<'a>(&'a self, path: &str, _data: &[u8]) -> BackendResult<File<'a>> {
        self.record(path);
        Ok(File::new(path, self))
    }

    async fn write_iterator<'a>(
        &'a self,
        path: &str,
        _chunks: ChunkStream,
    ) -> BackendResult<File<'a>> {
        self.record(path);
        Ok(File::new(path, self))
    }

    async fn delete(&self, path: &str) -> BackendResult<()> {
        self.record(path);
        Ok(())
    }

    fn backend_type(&self) -> &str {
        "mock"
    }
}
