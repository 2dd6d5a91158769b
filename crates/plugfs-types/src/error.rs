//! Error types shared by every adapter.
//!
//! Adapters normalize exactly one failure, absence of the addressed object,
//! into [`BackendError::NotFound`]. Everything else passes through unchanged
//! as the backend's own error.

use thiserror::Error;

/// Result type for adapter operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Adapter operation errors.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The addressed file, directory or parent directory does not exist.
    #[error("{message}")]
    NotFound { path: String, message: String },
    /// Local I/O failure other than absence (permissions, disk full, ...).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Blob-store failure other than absence (transport, conflicts, ...).
    #[error("blob store error: {0}")]
    Blob(#[from] BlobError),
}

impl BackendError {
    /// The file at `path` does not exist.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        let path = path.into();
        let message = format!("Failed to find file '{}'!", path);
        Self::NotFound { path, message }
    }

    /// The directory at `path` could not be listed because it does not exist.
    pub fn listing_not_found(path: impl Into<String>) -> Self {
        let path = path.into();
        let message = format!("Failed to retrieve directory listing '{}'!", path);
        Self::NotFound { path, message }
    }

    /// A write to `path` failed because its parent directory is missing.
    pub fn parent_not_found(path: impl Into<String>) -> Self {
        let path = path.into();
        let message = format!("Failed to write file '{}', directory does not exist!", path);
        Self::NotFound { path, message }
    }

    /// A delete of `path` failed because there was nothing to delete.
    pub fn delete_not_found(path: impl Into<String>) -> Self {
        let path = path.into();
        let message = format!("Failed to delete file '{}', file does not exist!", path);
        Self::NotFound { path, message }
    }

    /// Returns true for the normalized absence error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The requested path, for `NotFound` errors.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::NotFound { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Native errors raised by a blob-store client.
#[derive(Debug, Clone, Error)]
pub enum BlobError {
    #[error("blob not found: {0}")]
    NotFound(String),
    #[error("blob already exists: {0}")]
    AlreadyExists(String),
    #[error("transport error: {0}")]
    Transport(String),
    /// The upload source stream failed before the blob was committed.
    #[error("upload aborted: {0}")]
    Aborted(String),
}
