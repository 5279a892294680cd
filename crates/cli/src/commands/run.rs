//! `readlater run` — Poll Telegram and handle messages until interrupted.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use readlater_bot::{Consumer, ConsumerSettings, TelegramProcessor};
use readlater_channels::{TelegramClient, TelegramConfig};
use readlater_config::AppConfig;
use readlater_core::transport::Transport;
use tracing::{info, warn};

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Telegram bot token (overrides config and environment)
    #[arg(short, long)]
    pub token: Option<String>,

    /// Directory for saved pages
    #[arg(short, long)]
    pub storage_path: Option<PathBuf>,

    /// Keep pages in memory only; nothing survives a restart
    #[arg(long)]
    pub in_memory: bool,

    /// Updates fetched per poll (1..=100)
    #[arg(short, long)]
    pub batch_size: Option<usize>,
}

impl RunArgs {
    /// Flags win over the config file and the environment.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(token) = &self.token {
            config.telegram.token = Some(token.clone());
        }
        if let Some(path) = &self.storage_path {
            config.storage.base_path = path.display().to_string();
        }
        if self.in_memory {
            config.storage.backend = "memory".into();
        }
        if let Some(batch_size) = self.batch_size {
            config.consumer.batch_size = batch_size;
        }
    }
}

pub async fn run(
    config_path: Option<&Path>,
    args: RunArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config =
        super::load_unvalidated(config_path).map_err(|e| format!("Failed to load config: {e}"))?;
    args.apply(&mut config);
    config
        .validate()
        .map_err(|e| format!("Invalid configuration: {e}"))?;

    let token = config.require_token()?;
    let client = TelegramClient::new(TelegramConfig::from_settings(token, &config.telegram))?;
    let transport: Arc<dyn Transport> = Arc::new(client);

    let storage = super::open_storage(&config.storage)
        .await
        .map_err(|e| format!("Failed to open storage: {e}"))?;

    info!(
        transport = transport.name(),
        storage = storage.name(),
        path = %config.storage.resolved_path().display(),
        "Service started"
    );

    let processor = Arc::new(TelegramProcessor::new(transport, storage));
    let consumer = Consumer::new(
        processor.clone(),
        processor,
        ConsumerSettings::from_config(&config.consumer),
    );

    consumer.start_with_shutdown(shutdown_signal()).await;
    info!("Service stopped");

    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let mut config = AppConfig::default();
        config.telegram.token = Some("from-file".into());

        RunArgs {
            token: Some("from-flag".into()),
            storage_path: Some(PathBuf::from("/srv/pages")),
            in_memory: true,
            batch_size: Some(10),
        }
        .apply(&mut config);

        assert_eq!(config.telegram.token.as_deref(), Some("from-flag"));
        assert_eq!(config.storage.base_path, "/srv/pages");
        assert_eq!(config.storage.backend, "memory");
        assert_eq!(config.consumer.batch_size, 10);
    }

    #[test]
    fn no_flags_keep_config() {
        let mut config = AppConfig::default();
        RunArgs::default().apply(&mut config);
        assert!(config.telegram.token.is_none());
        assert_eq!(config.storage.backend, "file");
        assert_eq!(config.consumer.batch_size, 100);
    }

    #[test]
    fn flag_fixes_out_of_range_config_value() {
        let mut config = AppConfig::default();
        config.consumer.batch_size = 500;
        assert!(config.validate().is_err());

        RunArgs {
            batch_size: Some(50),
            ..Default::default()
        }
        .apply(&mut config);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn bad_batch_size_flag_fails_validation() {
        let mut config = AppConfig::default();
        RunArgs {
            batch_size: Some(0),
            ..Default::default()
        }
        .apply(&mut config);
        assert!(config.validate().is_err());
    }
}
