//! Messaging provider clients for readlater.
//!
//! Each client implements the core `Transport` trait against one chat
//! platform. Available clients:
//! - **Telegram** — Bot API over HTTPS (`getUpdates` polling, `sendMessage`)

pub mod telegram;

pub use telegram::{BotIdentity, TelegramClient, TelegramConfig};
