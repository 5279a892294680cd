//! Transport trait — the messaging provider as seen by the bot.
//!
//! A Transport delivers raw updates from the chat platform and sends text
//! replies back. The wire types mirror the subset of the Telegram Bot API
//! the bot reads, so an implementation can deserialize straight into them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// One raw notification from the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    /// Provider-assigned, increasing identifier
    #[serde(rename = "update_id")]
    pub id: i64,

    /// Present only for message updates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

/// A chat message carried by an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Absent for messages posted on behalf of a channel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,

    pub chat: Chat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
}

impl Update {
    /// Convenience constructor for a text message update.
    pub fn text(id: i64, chat_id: i64, username: &str, text: &str) -> Self {
        Self {
            id,
            message: Some(Message {
                text: Some(text.to_string()),
                from: Some(User {
                    id: chat_id,
                    username: Some(username.to_string()),
                }),
                chat: Chat { id: chat_id },
            }),
        }
    }
}

/// The core Transport trait.
///
/// Implementations handle connection details, request encoding and
/// provider error mapping. Calls block the caller until the provider answers
/// or the implementation's own timeout fires.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Human-readable transport name (e.g., "telegram").
    fn name(&self) -> &str;

    /// Fetch up to `limit` updates starting at `offset`.
    async fn fetch_updates(
        &self,
        offset: i64,
        limit: usize,
    ) -> std::result::Result<Vec<Update>, TransportError>;

    /// Send a plain text message to a chat.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
    ) -> std::result::Result<(), TransportError>;

    /// Health check — are the credentials accepted by the provider?
    async fn health_check(&self) -> std::result::Result<(), TransportError> {
        Ok(())
    }
}
