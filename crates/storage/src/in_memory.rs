//! In-memory backend — useful for testing and throwaway runs.

use async_trait::async_trait;
use rand::Rng;
use readlater_core::error::StorageError;
use readlater_core::storage::{Page, PageStore};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::validate_owner;

type OwnerPages = HashMap<String, Page>;

/// Pages kept in a map keyed by owner, then by page hash.
/// Nothing survives a restart.
#[derive(Clone)]
pub struct InMemoryBackend {
    pages: Arc<RwLock<HashMap<String, OwnerPages>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            pages: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageStore for InMemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn save(&self, page: &Page) -> Result<(), StorageError> {
        validate_owner(&page.owner)?;
        self.pages
            .write()
            .await
            .entry(page.owner.clone())
            .or_default()
            .insert(page.hash(), page.clone());
        Ok(())
    }

    async fn pick_random(&self, owner: &str) -> Result<Page, StorageError> {
        validate_owner(owner)?;
        let pages = self.pages.read().await;
        let owned = pages
            .get(owner)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| StorageError::NoSavedPages {
                owner: owner.to_string(),
            })?;

        let idx = rand::rng().random_range(0..owned.len());
        owned
            .values()
            .nth(idx)
            .cloned()
            .ok_or_else(|| StorageError::NoSavedPages {
                owner: owner.to_string(),
            })
    }

    async fn remove(&self, page: &Page) -> Result<(), StorageError> {
        validate_owner(&page.owner)?;
        let mut pages = self.pages.write().await;
        let hash = page.hash();
        let removed = pages
            .get_mut(&page.owner)
            .and_then(|owned| owned.remove(&hash));

        match removed {
            Some(_) => {
                if pages.get(&page.owner).is_some_and(HashMap::is_empty) {
                    pages.remove(&page.owner);
                }
                Ok(())
            }
            None => Err(StorageError::NotFound(hash)),
        }
    }

    async fn exists(&self, page: &Page) -> Result<bool, StorageError> {
        validate_owner(&page.owner)?;
        Ok(self
            .pages
            .read()
            .await
            .get(&page.owner)
            .is_some_and(|owned| owned.contains_key(&page.hash())))
    }

    async fn count(&self, owner: &str) -> Result<usize, StorageError> {
        validate_owner(owner)?;
        Ok(self.pages.read().await.get(owner).map_or(0, HashMap::len))
    }
}
