//! Page storage implementations for readlater.

pub mod file_backend;
pub mod in_memory;

pub use file_backend::FileBackend;
pub use in_memory::InMemoryBackend;

use readlater_core::error::StorageError;

/// Reject owner names that cannot safely become a directory name.
///
/// Telegram usernames are `[A-Za-z0-9_]`; the fallback owners are `id<n>` and
/// `chat<n>`, so anything with separators or dot-only names is a bug upstream.
pub fn validate_owner(owner: &str) -> Result<(), StorageError> {
    let bad = owner.is_empty()
        || owner == "."
        || owner == ".."
        || owner.contains(['/', '\\', '\0']);
    if bad {
        return Err(StorageError::InvalidOwner(owner.to_string()));
    }
    Ok(())
}
