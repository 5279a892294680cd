//! Configuration loading, validation, and management for readlater.
//!
//! Loads configuration from `~/.readlater/config.toml` with environment
//! variable overrides. Validates all settings at startup. Command-line flags
//! are applied on top by the CLI.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Telegram accepts at most this many updates per `getUpdates` call.
pub const MAX_BATCH_SIZE: usize = 100;

/// The root configuration structure.
///
/// Maps directly to `~/.readlater/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Messaging provider settings
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Page storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Event loop settings
    #[serde(default)]
    pub consumer: ConsumerConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token from @BotFather
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// API host; may carry a scheme (`http://127.0.0.1:8081`) for local servers
    #[serde(default = "default_api_host")]
    pub api_host: String,

    /// `getUpdates` long-poll timeout in seconds (0 = short polling)
    #[serde(default)]
    pub long_poll_timeout_secs: u32,

    /// Per-request timeout for every provider call
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_api_host() -> String {
    "api.telegram.org".into()
}
fn default_request_timeout() -> u64 {
    60
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_host: default_api_host(),
            long_poll_timeout_secs: 0,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &redact(&self.token))
            .field("api_host", &self.api_host)
            .field("long_poll_timeout_secs", &self.long_poll_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// "file" or "memory"
    #[serde(default = "default_storage_backend")]
    pub backend: String,

    /// Root directory of the file backend; `~/` is expanded
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// Create the base directory on startup if it is missing
    #[serde(default = "default_true")]
    pub create_if_missing: bool,
}

fn default_storage_backend() -> String {
    "file".into()
}
fn default_base_path() -> String {
    "~/.readlater/pages".into()
}
fn default_true() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            base_path: default_base_path(),
            create_if_missing: true,
        }
    }
}

impl StorageConfig {
    /// The base path with a leading `~/` replaced by the home directory.
    pub fn resolved_path(&self) -> PathBuf {
        expand_home(&self.base_path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumerConfig {
    /// Maximum updates fetched per batch (1..=100)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Sleep after an empty batch
    #[serde(default = "default_idle_interval")]
    pub idle_interval_ms: u64,

    /// Delay policy after a failed fetch
    #[serde(default)]
    pub backoff: BackoffConfig,
}

fn default_batch_size() -> usize {
    MAX_BATCH_SIZE
}
fn default_idle_interval() -> u64 {
    1000
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            idle_interval_ms: default_idle_interval(),
            backoff: BackoffConfig::default(),
        }
    }
}

/// Exponential backoff with a cap. `initial_ms = 0` retries immediately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    #[serde(default = "default_backoff_initial")]
    pub initial_ms: u64,

    #[serde(default = "default_backoff_max")]
    pub max_ms: u64,

    #[serde(default = "default_backoff_multiplier")]
    pub multiplier: f64,
}

fn default_backoff_initial() -> u64 {
    500
}
fn default_backoff_max() -> u64 {
    30_000
}
fn default_backoff_multiplier() -> f64 {
    2.0
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_ms: default_backoff_initial(),
            max_ms: default_backoff_max(),
            multiplier: default_backoff_multiplier(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.readlater/config.toml).
    ///
    /// Environment overrides, highest priority first:
    /// - `READLATER_TELEGRAM_TOKEN`, then `TELEGRAM_BOT_TOKEN` if no token is set
    /// - `READLATER_STORAGE_PATH`
    /// - `READLATER_BATCH_SIZE`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_layered(&Self::default_path())
    }

    /// Load `path`, then apply environment overrides and validate the result.
    pub fn load_layered(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load_with_env(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` and apply environment overrides, leaving validation to
    /// the caller so further overrides (CLI flags) can still be layered on.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// `~/.readlater/config.toml`
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from a specific file path.
    ///
    /// Not validated: overrides applied afterwards may still fix a value.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(config)
    }

    /// Apply environment overrides using the given lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("READLATER_TELEGRAM_TOKEN") {
            self.telegram.token = Some(token);
        } else if self.telegram.token.is_none() {
            self.telegram.token = lookup("TELEGRAM_BOT_TOKEN");
        }

        if let Some(path) = lookup("READLATER_STORAGE_PATH") {
            self.storage.base_path = path;
        }

        if let Some(raw) = lookup("READLATER_BATCH_SIZE") {
            self.consumer.batch_size = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: "READLATER_BATCH_SIZE".into(),
                value: raw.clone(),
            })?;
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".readlater")
    }

    /// The configured bot token, or an error naming how to provide one.
    pub fn require_token(&self) -> Result<&str, ConfigError> {
        match self.telegram.token.as_deref() {
            Some(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(ConfigError::MissingToken),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_BATCH_SIZE).contains(&self.consumer.batch_size) {
            return Err(ConfigError::ValidationError(format!(
                "consumer.batch_size must be between 1 and {MAX_BATCH_SIZE}"
            )));
        }

        let backoff = &self.consumer.backoff;
        if !backoff.multiplier.is_finite() || backoff.multiplier < 1.0 {
            return Err(ConfigError::ValidationError(
                "consumer.backoff.multiplier must be >= 1.0".into(),
            ));
        }
        if backoff.max_ms < backoff.initial_ms {
            return Err(ConfigError::ValidationError(
                "consumer.backoff.max_ms must be >= initial_ms".into(),
            ));
        }

        if !matches!(self.storage.backend.as_str(), "file" | "memory") {
            return Err(ConfigError::ValidationError(format!(
                "storage.backend must be \"file\" or \"memory\", got {:?}",
                self.storage.backend
            )));
        }
        if self.storage.backend == "file" && self.storage.base_path.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "storage.base_path must not be empty".into(),
            ));
        }

        if self.telegram.api_host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "telegram.api_host must not be empty".into(),
            ));
        }
        if self.telegram.request_timeout_secs <= u64::from(self.telegram.long_poll_timeout_secs) {
            return Err(ConfigError::ValidationError(
                "telegram.request_timeout_secs must exceed long_poll_timeout_secs".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Replace a leading `~/` with the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs_home().join(rest),
        None if path == "~" => dirs_home(),
        None => PathBuf::from(path),
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Invalid value for environment variable {key}: {value:?}")]
    InvalidEnv { key: String, value: String },

    #[error(
        "Telegram bot token is not specified (use --token, READLATER_TELEGRAM_TOKEN or [telegram].token)"
    )]
    MissingToken,
}
