//! `readlater onboard` — First-time setup.

use std::path::Path;

use readlater_config::AppConfig;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let default_path = AppConfig::default_path();
    let config_path = config_path.unwrap_or(default_path.as_path());

    println!("📚 readlater — First-Time Setup");
    println!("===============================\n");

    if let Some(dir) = config_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if dir.exists() {
            println!("  Config directory exists: {}", dir.display());
        } else {
            std::fs::create_dir_all(dir)?;
            println!("✅ Created config directory: {}", dir.display());
        }
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        std::fs::write(config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
    }

    let config = super::load_config(Some(config_path))
        .map_err(|e| format!("Failed to load config: {e}"))?;

    if config.storage.backend == "file" {
        let storage_dir = config.storage.resolved_path();
        if storage_dir.exists() {
            println!("  Storage directory exists: {}", storage_dir.display());
        } else {
            std::fs::create_dir_all(&storage_dir)?;
            println!("✅ Created storage directory: {}", storage_dir.display());
        }
    }

    if config.require_token().is_err() {
        println!("\n📝 Next steps:");
        println!("   1. Create a bot with @BotFather and copy its token");
        println!(
            "   2. Put it in {} under [telegram] token, or export READLATER_TELEGRAM_TOKEN",
            config_path.display()
        );
        println!("   3. Run: readlater run\n");
    } else {
        println!("\n🎉 Setup complete! Run `readlater run` to start the bot.\n");
    }

    Ok(())
}
