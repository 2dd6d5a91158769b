//! Adapter configuration.

use serde::Deserialize;

/// Default window for streamed reads: 1 MiB.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Construction-time settings shared by adapters.
///
/// Deserializable so embedders can keep it in their own config files;
/// missing fields fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Window size for `get_iterator` on backends that choose their own
    /// chunk boundaries. Zero is treated as one byte.
    pub chunk_size: usize,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl AdapterConfig {
    /// Set the streamed-read window.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// The effective window, never zero.
    pub fn effective_chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }
}
