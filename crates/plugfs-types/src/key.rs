//! Blob-key arithmetic for flat namespaces.
//!
//! Object stores have no directories, only keys like `/directory/a.bin`.
//! A one-level directory view is rebuilt from the keys under a prefix:
//!
//! ```text
//! prefix "/directory/"
//!   /directory/256kb.bin              → File      /directory/256kb.bin
//!   /directory/subdirectory/nested    → Directory /directory/subdirectory
//!   /directory/subdirectory/other     → (same Directory, emitted once)
//! ```

use std::borrow::Cow;

/// Path separator inside blob keys.
pub const SEPARATOR: char = '/';

/// Turn a listing path into the key prefix that selects its children.
///
/// The empty string is the root prefix. Anything else gets a trailing
/// separator unless it already has one, so `"dir"` and `"dir/"` select the
/// same keys.
pub fn listing_prefix(path: &str) -> Cow<'_, str> {
    if path.is_empty() || path.ends_with(SEPARATOR) {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(format!("{}{}", path, SEPARATOR))
    }
}

/// What a key contributes to the listing of a prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyChild<'k> {
    /// The key is a direct child; carries the full key.
    File(&'k str),
    /// The key lives below a pseudo-directory; carries `prefix + segment`.
    Directory(String),
}

/// Classify `key` relative to `prefix`.
///
/// Returns `None` when the key is not under the prefix, when it equals the
/// prefix, or when its first relative segment is empty (`prefix//x`).
pub fn classify_key<'k>(prefix: &str, key: &'k str) -> Option<KeyChild<'k>> {
    let relative = key.strip_prefix(prefix)?;
    match relative.split_once(SEPARATOR) {
        None if relative.is_empty() => None,
        None => Some(KeyChild::File(key)),
        Some(("", _)) => None,
        Some((segment, _)) => Some(KeyChild::Directory(format!("{}{}", prefix, segment))),
    }
}

/// Last non-empty segment of a path, used as the display name of an item.
///
/// Works for both blob keys and native paths on `/`-separated systems.
/// The root (`""` or `"/"`) has an empty name.
pub fn item_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches(|c: char| c == SEPARATOR || c == std::path::MAIN_SEPARATOR);
    match trimmed.rfind(|c: char| c == SEPARATOR || c == std::path::MAIN_SEPARATOR) {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}
