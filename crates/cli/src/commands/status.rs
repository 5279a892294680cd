//! `readlater status` — Show configuration and stored pages.

use std::path::Path;

use readlater_config::AppConfig;

pub async fn run(
    config_path: Option<&Path>,
    user: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config =
        super::load_config(config_path).map_err(|e| format!("Failed to load config: {e}"))?;

    println!("📚 readlater Status");
    println!("===================");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  API host:     {}", config.telegram.api_host);
    println!(
        "  Token:        {}",
        if config.require_token().is_ok() { "set" } else { "missing" }
    );
    println!("  Long poll:    {}s", config.telegram.long_poll_timeout_secs);
    println!("  Storage:      {}", config.storage.backend);
    println!("  Pages dir:    {}", config.storage.resolved_path().display());
    println!("  Batch size:   {}", config.consumer.batch_size);
    println!("  Idle sleep:   {}ms", config.consumer.idle_interval_ms);
    println!(
        "  Backoff:      {}ms → {}ms (×{})",
        config.consumer.backoff.initial_ms,
        config.consumer.backoff.max_ms,
        config.consumer.backoff.multiplier
    );

    if let Some(user) = user {
        let storage = super::open_storage(&config.storage).await?;
        let count = storage.count(&user).await?;
        println!("\n  Saved pages for {user}: {count}");
    }

    let config_file = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::default_path);
    if config_file.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `readlater onboard` first");
    }

    Ok(())
}
