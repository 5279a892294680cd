//! Page store trait — the per-owner set of saved links.
//!
//! A page is identified by a hash over its URL and owner. That hash is both
//! the dedup key and the storage key, so the same link saved by two users is
//! two pages, and saving the same link twice for one user is one page.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::StorageError;

/// A saved link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// The link exactly as the user sent it (after trimming)
    pub url: String,

    /// The user the link belongs to
    pub owner: String,

    /// When the page was saved; not part of its identity
    pub saved_at: DateTime<Utc>,
}

impl Page {
    pub fn new(url: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            owner: owner.into(),
            saved_at: Utc::now(),
        }
    }

    /// Deterministic identity over (url, owner), hex-encoded SHA-256.
    ///
    /// The fields are separated by a NUL byte so `("ab", "c")` and
    /// `("a", "bc")` hash differently.
    pub fn hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.url.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.owner.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl PartialEq for Page {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url && self.owner == other.owner
    }
}

impl Eq for Page {}

/// The core PageStore trait.
///
/// Implementations: file-backed, in-memory (for testing).
/// Implementations must be safe for concurrent use.
#[async_trait]
pub trait PageStore: Send + Sync {
    /// The backend name (e.g., "file", "memory").
    fn name(&self) -> &str;

    /// Persist a page. Overwrites a page with the same identity.
    async fn save(&self, page: &Page) -> std::result::Result<(), StorageError>;

    /// Pick one of the owner's pages at random.
    ///
    /// Fails with [`StorageError::NoSavedPages`] when the owner has none.
    async fn pick_random(&self, owner: &str) -> std::result::Result<Page, StorageError>;

    /// Remove a page.
    async fn remove(&self, page: &Page) -> std::result::Result<(), StorageError>;

    /// Whether a page with the same identity is stored.
    async fn exists(&self, page: &Page) -> std::result::Result<bool, StorageError>;

    /// Number of pages stored for the owner.
    async fn count(&self, owner: &str) -> std::result::Result<usize, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let a = Page::new("http://foo.io", "bob");
        let b = Page::new("http://foo.io", "bob");
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.hash().len(), 64);
    }

    #[test]
    fn hash_depends_on_owner_and_url() {
        let bob = Page::new("http://foo.io", "bob");
        let alice = Page::new("http://foo.io", "alice");
        let other = Page::new("http://bar.io", "bob");
        assert_ne!(bob.hash(), alice.hash());
        assert_ne!(bob.hash(), other.hash());
    }

    #[test]
    fn hash_separates_fields() {
        let a = Page::new("ab", "c");
        let b = Page::new("a", "bc");
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn equality_ignores_saved_at() {
        let mut a = Page::new("http://foo.io", "bob");
        let b = Page::new("http://foo.io", "bob");
        a.saved_at = DateTime::<Utc>::from_timestamp(0, 0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn page_serialization() {
        let page = Page::new("https://example.com/a", "bob");
        let json = serde_json::to_string(&page).unwrap();
        assert!(json.contains("https://example.com/a"));
        let back: Page = serde_json::from_str(&json).unwrap();
        assert_eq!(back, page);
        assert_eq!(back.saved_at, page.saved_at);
    }
}
