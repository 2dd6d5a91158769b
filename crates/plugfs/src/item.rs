//! Filesystem items: transient views produced by `list` and friends.
//!
//! Items never own data. A `File` is a path plus a borrowed reference to the
//! adapter that produced it, and every capability goes back through that
//! adapter. Nothing is cached beyond a size captured at listing time.

use std::fmt;
use std::ops::Index;

use crate::adapter::{Adapter, ChunkStream};
use plugfs_types::{item_name, BackendResult};

/// A container: a real directory or a pseudo-directory synthesized from
/// blob-key prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    path: String,
}

impl Directory {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last segment of the path.
    pub fn name(&self) -> &str {
        item_name(&self.path)
    }
}

/// Handle to a stored object.
///
/// Borrows the adapter that created it, so a `File` cannot outlive its
/// backend connection.
#[derive(Clone)]
pub struct File<'a> {
    path: String,
    size: Option<u64>,
    adapter: &'a dyn Adapter,
}

impl<'a> File<'a> {
    pub fn new(path: impl Into<String>, adapter: &'a dyn Adapter) -> Self {
        Self {
            path: path.into(),
            size: None,
            adapter,
        }
    }

    /// Attach a size already known to the caller (e.g. from a listing).
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last segment of the path.
    pub fn name(&self) -> &str {
        item_name(&self.path)
    }

    /// The adapter this handle delegates to.
    pub fn adapter(&self) -> &'a dyn Adapter {
        self.adapter
    }

    /// Size in bytes; asks the backend unless captured at listing time.
    pub async fn size(&self) -> BackendResult<u64> {
        match self.size {
            Some(size) => Ok(size),
            None => self.adapter.size(&self.path).await,
        }
    }

    pub async fn read(&self) -> BackendResult<Vec<u8>> {
        self.adapter.read(&self.path).await
    }

    pub async fn get_iterator(&self) -> BackendResult<ChunkStream> {
        self.adapter.get_iterator(&self.path).await
    }

    /// Replace the content; returns a fresh handle for the new object.
    pub async fn write(&self, data: &[u8]) -> BackendResult<File<'a>> {
        self.adapter.write(&self.path, data).await
    }

    pub async fn write_iterator(&self, chunks: ChunkStream) -> BackendResult<File<'a>> {
        self.adapter.write_iterator(&self.path, chunks).await
    }

    pub async fn delete(&self) -> BackendResult<()> {
        self.adapter.delete(&self.path).await
    }
}

impl fmt::Debug for File<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File")
            .field("path", &self.path)
            .field("size", &self.size)
            .field("backend", &self.adapter.backend_type())
            .finish()
    }
}

/// One entry of a directory listing.
#[derive(Debug, Clone)]
pub enum FilesystemItem<'a> {
    Directory(Directory),
    File(File<'a>),
}

impl<'a> FilesystemItem<'a> {
    pub fn path(&self) -> &str {
        match self {
            Self::Directory(dir) => dir.path(),
            Self::File(file) => file.path(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Directory(dir) => dir.name(),
            Self::File(file) => file.name(),
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Directory(_))
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    pub fn as_file(&self) -> Option<&File<'a>> {
        match self {
            Self::File(file) => Some(file),
            Self::Directory(_) => None,
        }
    }

    pub fn as_dir(&self) -> Option<&Directory> {
        match self {
            Self::Directory(dir) => Some(dir),
            Self::File(_) => None,
        }
    }
}

impl From<Directory> for FilesystemItem<'_> {
    fn from(dir: Directory) -> Self {
        Self::Directory(dir)
    }
}

impl<'a> From<File<'a>> for FilesystemItem<'a> {
    fn from(file: File<'a>) -> Self {
        Self::File(file)
    }
}

/// Ordered result of one `list` call. Order is backend-defined and
/// deterministic for a given backend state.
#[derive(Debug, Clone, Default)]
pub struct DirectoryListing<'a> {
    items: Vec<FilesystemItem<'a>>,
}

impl<'a> DirectoryListing<'a> {
    pub fn new(items: Vec<FilesystemItem<'a>>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FilesystemItem<'a>> {
        self.items.iter()
    }

    pub fn get(&self, index: usize) -> Option<&FilesystemItem<'a>> {
        self.items.get(index)
    }

    /// The file entries, in listing order.
    pub fn files(&self) -> impl Iterator<Item = &File<'a>> {
        self.items.iter().filter_map(FilesystemItem::as_file)
    }

    /// The directory entries, in listing order.
    pub fn directories(&self) -> impl Iterator<Item = &Directory> {
        self.items.iter().filter_map(FilesystemItem::as_dir)
    }

    /// True if some entry has exactly this path.
    pub fn contains_path(&self, path: &str) -> bool {
        self.items.iter().any(|item| item.path() == path)
    }

    pub fn into_vec(self) -> Vec<FilesystemItem<'a>> {
        self.items
    }
}

impl<'a> From<Vec<FilesystemItem<'a>>> for DirectoryListing<'a> {
    fn from(items: Vec<FilesystemItem<'a>>) -> Self {
        Self::new(items)
    }
}

impl<'a> Index<usize> for DirectoryListing<'a> {
    type Output = FilesystemItem<'a>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.items[index]
    }
}

impl<'a> IntoIterator for DirectoryListing<'a> {
    type Item = FilesystemItem<'a>;
    type IntoIter = std::vec::IntoIter<FilesystemItem<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'l, 'a> IntoIterator for &'l DirectoryListing<'a> {
    type Item = &'l FilesystemItem<'a>;
    type IntoIter = std::slice::Iter<'l, FilesystemItem<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::MockAdapter;

    #[test]
    fn test_directory_name() {
        let dir = Directory::new("/directory/subdirectory");
        assert_eq!(dir.path(), "/directory/subdirectory");
        assert_eq!(dir.name(), "subdirectory");
    }

    #[tokio::test]
    async fn test_file_size_prefers_captured_value() {
        let adapter = MockAdapter::default();
        let file = File::new("/a.bin", &adapter).with_size(42);
        assert_eq!(file.size().await.unwrap(), 42);
        assert_eq!(adapter.calls(), 0);

        let file = File::new("/a.bin", &adapter);
        assert_eq!(file.size().await.unwrap(), MockAdapter::SIZE);
        assert_eq!(adapter.calls(), 1);
    }

    #[tokio::test]
    async fn test_file_capabilities_delegate_to_adapter() {
        let adapter = MockAdapter::default();
        let file = File::new("/a.bin", &adapter);

        file.read().await.unwrap();
        file.get_iterator().await.unwrap();
        file.write(b"data").await.unwrap();
        file.delete().await.unwrap();
        assert_eq!(adapter.calls(), 4);
        assert_eq!(adapter.last_path().as_deref(), Some("/a.bin"));
    }

    #[test]
    fn test_listing_accessors() {
        let adapter = MockAdapter::default();
        let listing = DirectoryListing::new(vec![
            FilesystemItem::from(File::new("/1mb.bin", &adapter)),
            FilesystemItem::from(Directory::new("/directory")),
        ]);

        assert_eq!(listing.len(), 2);
        assert!(listing[0].is_file());
        assert!(listing[1].is_dir());
        assert_eq!(listing[0].name(), "1mb.bin");
        assert_eq!(listing.files().count(), 1);
        assert_eq!(listing.directories().count(), 1);
        assert!(listing.contains_path("/directory"));
        assert!(!listing.contains_path("/nope"));

        let debug = format!("{:?}", listing[0]);
        assert!(debug.contains("mock"));
    }
}
