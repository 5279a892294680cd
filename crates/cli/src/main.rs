//! readlater CLI — the main entry point.
//!
//! Commands:
//! - `run`      — Start the bot
//! - `onboard`  — Write a default config and create the storage directory
//! - `status`   — Show configuration and stored page counts
//! - `doctor`   — Diagnose config, storage and Telegram connectivity

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "readlater",
    about = "readlater — save links in Telegram, get a random one back later",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of ~/.readlater/config.toml
    #[arg(short, long, global = true, env = "READLATER_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run(commands::run::RunArgs),

    /// Initialize configuration and storage
    Onboard,

    /// Show configuration and stored pages
    Status {
        /// Also count the pages saved by this user
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Diagnose system health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Run(args) => commands::run::run(config, args).await?,
        Commands::Onboard => commands::onboard::run(config).await?,
        Commands::Status { user } => commands::status::run(config, user).await?,
        Commands::Doctor => commands::doctor::run(config).await?,
    }

    Ok(())
}
