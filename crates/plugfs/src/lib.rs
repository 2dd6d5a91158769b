//! plugfs: one filesystem API over pluggable storage backends.
//!
//! This crate provides:
//!
//! - **Filesystem**: the facade callers program against
//! - **Adapter**: the async contract every backend implements
//! - **LocalAdapter**: local disk, real directories
//! - **ObjectStorageAdapter**: flat blob keys with synthesized directories
//! - **BlobStore**: the client boundary for blob containers, plus an
//!   in-memory container
//!
//! ```no_run
//! # async fn demo() -> plugfs::BackendResult<()> {
//! use plugfs::{Filesystem, LocalAdapter};
//!
//! let fs = Filesystem::new(LocalAdapter::new());
//! for item in &fs.list("/tmp").await? {
//!     println!("{} {}", if item.is_dir() { "d" } else { "-" }, item.path());
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod blob;
pub mod config;
pub mod filesystem;
pub mod item;

pub use adapter::{collect_chunks, Adapter, ChunkStream, LocalAdapter, ObjectStorageAdapter};
pub use blob::{BlobDownload, BlobItem, BlobListing, BlobStore, MemoryBlobStore};
pub use config::{AdapterConfig, DEFAULT_CHUNK_SIZE};
pub use filesystem::Filesystem;
pub use item::{Directory, DirectoryListing, File, FilesystemItem};
pub use plugfs_types::{BackendError, BackendResult, BlobError};
