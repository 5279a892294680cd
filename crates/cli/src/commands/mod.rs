pub mod doctor;
pub mod onboard;
pub mod run;
pub mod status;

use std::path::Path;
use std::sync::Arc;

use readlater_config::{AppConfig, ConfigError, StorageConfig};
use readlater_core::error::StorageError;
use readlater_core::storage::PageStore;
use readlater_storage::{FileBackend, InMemoryBackend};

/// Load the config file (explicit path or the default), env overrides applied.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => AppConfig::load_layered(path),
        None => AppConfig::load(),
    }
}

/// Like [`load_config`], but the caller validates after its own overrides.
pub fn load_unvalidated(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load_with_env(&AppConfig::default_path()),
    }
}

/// Open the page store selected by `[storage]`.
pub async fn open_storage(config: &StorageConfig) -> Result<Arc<dyn PageStore>, StorageError> {
    match config.backend.as_str() {
        "memory" => Ok(Arc::new(InMemoryBackend::new())),
        _ => {
            let backend =
                FileBackend::open(config.resolved_path(), config.create_if_missing).await?;
            Ok(Arc::new(backend))
        }
    }
}
