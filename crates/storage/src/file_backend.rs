//! File-based page store — one JSON file per saved page.
//!
//! Layout: `<base>/<owner>/<hash>.json`, where `hash` is the page identity.
//! Writes go to a temporary file in the same directory and are renamed into
//! place, so a crash never leaves a half-written page behind.
//!
//! Storage location defaults to `~/.readlater/pages`.

use async_trait::async_trait;
use rand::Rng;
use readlater_core::error::StorageError;
use readlater_core::storage::{Page, PageStore};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::validate_owner;

const PAGE_EXT: &str = "json";

/// A directory-backed page store.
#[derive(Debug, Clone)]
pub struct FileBackend {
    base_path: PathBuf,
}

impl FileBackend {
    /// Open a store rooted at `base_path`.
    ///
    /// Fails if the path exists but is not a directory, or if it is missing
    /// and `create_if_missing` is false.
    pub async fn open(
        base_path: impl Into<PathBuf>,
        create_if_missing: bool,
    ) -> Result<Self, StorageError> {
        let base_path = base_path.into();

        match tokio::fs::metadata(&base_path).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(StorageError::NotInitialized(format!(
                    "base path '{}' is not a directory",
                    base_path.display()
                )));
            }
            Err(e) if e.kind() == ErrorKind::NotFound && create_if_missing => {
                tokio::fs::create_dir_all(&base_path).await.map_err(|e| {
                    StorageError::io(
                        format!("cannot create base path '{}'", base_path.display()),
                        e,
                    )
                })?;
                debug!(path = %base_path.display(), "Created storage directory");
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotInitialized(format!(
                    "base path '{}' does not exist",
                    base_path.display()
                )));
            }
            Err(e) => {
                return Err(StorageError::io(
                    format!("could not stat base path '{}'", base_path.display()),
                    e,
                ));
            }
        }

        debug!(path = %base_path.display(), "File page store opened");
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn owner_dir(&self, owner: &str) -> Result<PathBuf, StorageError> {
        validate_owner(owner)?;
        Ok(self.base_path.join(owner))
    }

    fn page_path(&self, page: &Page) -> Result<PathBuf, StorageError> {
        Ok(self
            .owner_dir(&page.owner)?
            .join(format!("{}.{PAGE_EXT}", page.hash())))
    }

    /// Paths of every stored page for the owner; empty if the owner is new.
    async fn list_pages(&self, owner: &str) -> Result<Vec<PathBuf>, StorageError> {
        let dir = self.owner_dir(owner)?;

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StorageError::io(
                    format!("cannot read user directory '{}'", dir.display()),
                    e,
                ));
            }
        };

        let mut pages = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            StorageError::io(format!("cannot list user directory '{}'", dir.display()), e)
        })? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == PAGE_EXT) {
                pages.push(path);
            }
        }
        Ok(pages)
    }

    async fn decode_page(path: &Path) -> Result<Page, StorageError> {
        let content = tokio::fs::read(path).await.map_err(|e| {
            StorageError::io(format!("can't open file with page '{}'", path.display()), e)
        })?;

        serde_json::from_slice(&content).map_err(|e| StorageError::Serialization {
            context: format!("can't decode page '{}'", path.display()),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl PageStore for FileBackend {
    fn name(&self) -> &str {
        "file"
    }

    async fn save(&self, page: &Page) -> Result<(), StorageError> {
        let dir = self.owner_dir(&page.owner)?;
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            StorageError::io(format!("cannot create user directory '{}'", dir.display()), e)
        })?;

        let path = self.page_path(page)?;
        let content = serde_json::to_vec_pretty(page).map_err(|e| StorageError::Serialization {
            context: "cannot encode page".into(),
            reason: e.to_string(),
        })?;

        let suffix: u32 = rand::rng().random();
        let tmp = dir.join(format!("{}.{suffix:08x}.tmp", page.hash()));
        tokio::fs::write(&tmp, &content).await.map_err(|e| {
            StorageError::io(format!("cannot create page file '{}'", tmp.display()), e)
        })?;

        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                warn!(
                    path = %tmp.display(),
                    error = %cleanup,
                    "Cannot remove temporary page file"
                );
            }
            return Err(StorageError::io(
                format!("cannot move page file into '{}'", path.display()),
                e,
            ));
        }

        debug!(owner = %page.owner, path = %path.display(), "Page saved");
        Ok(())
    }

    async fn pick_random(&self, owner: &str) -> Result<Page, StorageError> {
        let pages = self.list_pages(owner).await?;
        if pages.is_empty() {
            return Err(StorageError::NoSavedPages {
                owner: owner.to_string(),
            });
        }

        let idx = rand::rng().random_range(0..pages.len());
        Self::decode_page(&pages[idx]).await
    }

    async fn remove(&self, page: &Page) -> Result<(), StorageError> {
        let path = self.page_path(page)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(owner = %page.owner, path = %path.display(), "Page removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(page.hash())),
            Err(e) => Err(StorageError::io(
                format!("can't remove page for path: {}", path.display()),
                e,
            )),
        }
    }

    async fn exists(&self, page: &Page) -> Result<bool, StorageError> {
        let path = self.page_path(page)?;
        tokio::fs::try_exists(&path).await.map_err(|e| {
            StorageError::io(
                format!("error checking page existence for '{}'", path.display()),
                e,
            )
        })
    }

    async fn count(&self, owner: &str) -> Result<usize, StorageError> {
        Ok(self.list_pages(owner).await?.len())
    }
}
