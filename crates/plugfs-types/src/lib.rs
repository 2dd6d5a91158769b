//! Pure data types for plugfs: normalized errors and blob-key arithmetic.
//!
//! This crate is a leaf dependency with no async runtime and no I/O. It
//! exists so that blob-store clients can speak plugfs's error vocabulary
//! without pulling in the adapters and their runtime dependencies.

pub mod error;
pub mod key;

pub use error::*;
pub use key::*;
