//! `readlater doctor` — Diagnose system health.

use std::path::Path;

use readlater_channels::{TelegramClient, TelegramConfig};
use readlater_config::AppConfig;
use readlater_core::transport::Transport;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 readlater Doctor — System Diagnostics");
    println!("========================================\n");

    let mut issues = 0;

    let config_file = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::default_path);
    if config_file.exists() {
        println!("  ✅ Config file found: {}", config_file.display());
    } else {
        println!("  ⚠️  No config file — using defaults (run `readlater onboard`)");
    }

    let config = match super::load_config(config_path) {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            println!("\n  ⚠️  Fix the configuration before running further checks.");
            return Ok(());
        }
    };

    match super::open_storage(&config.storage).await {
        Ok(storage) => println!(
            "  ✅ Storage ready ({}: {})",
            storage.name(),
            config.storage.resolved_path().display()
        ),
        Err(e) => {
            println!("  ❌ Storage unavailable: {e}");
            issues += 1;
        }
    }

    match config.require_token() {
        Ok(token) => {
            println!("  ✅ Bot token configured");
            if !check_telegram(token, &config.telegram).await {
                issues += 1;
            }
        }
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

/// Build the Telegram client and ask the API whether the token is accepted.
async fn check_telegram(token: &str, settings: &readlater_config::TelegramConfig) -> bool {
    match TelegramClient::new(TelegramConfig::from_settings(token, settings)) {
        Ok(client) => check_transport(&client).await,
        Err(e) => {
            println!("  ❌ Telegram client setup failed: {e}");
            false
        }
    }
}

async fn check_transport(transport: &dyn Transport) -> bool {
    match transport.health_check().await {
        Ok(()) => {
            println!("  ✅ Telegram reachable ({})", transport.name());
            true
        }
        Err(e) => {
            println!("  ❌ Telegram check failed: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use readlater_core::error::TransportError;
    use readlater_core::transport::Update;

    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        fn name(&self) -> &str {
            "unreachable"
        }

        async fn fetch_updates(&self, _: i64, _: usize) -> Result<Vec<Update>, TransportError> {
            Ok(Vec::new())
        }

        async fn send_message(&self, _: i64, _: &str) -> Result<(), TransportError> {
            Ok(())
        }

        async fn health_check(&self) -> Result<(), TransportError> {
            Err(TransportError::Http {
                method: "getMe".into(),
                reason: "connection refused".into(),
            })
        }
    }

    struct Reachable;

    #[async_trait]
    impl Transport for Reachable {
        fn name(&self) -> &str {
            "reachable"
        }

        async fn fetch_updates(&self, _: i64, _: usize) -> Result<Vec<Update>, TransportError> {
            Ok(Vec::new())
        }

        async fn send_message(&self, _: i64, _: &str) -> Result<(), TransportError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn failed_health_check_is_reported() {
        assert!(!check_transport(&Unreachable).await);
        assert!(check_transport(&Reachable).await);
    }

    #[tokio::test]
    async fn client_setup_failure_is_a_failed_check() {
        let settings = readlater_config::TelegramConfig::default();
        assert!(!check_telegram("   ", &settings).await);
    }
}
