//! Event model — what the event loop moves from the fetcher to the processor.
//!
//! Each variant carries its own typed metadata; the processor matches on the
//! variant.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::EventError;

/// Metadata of a chat message event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMeta {
    /// Where replies go
    pub chat_id: i64,
    /// Who the saved pages belong to; never empty
    pub username: String,
}

/// All events the bot understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A text message from a user
    Message { text: String, meta: MessageMeta },

    /// Anything else the provider delivered (edits, callbacks, joins, ...)
    Unknown { update_id: i64 },
}

/// Event discriminant, for logging and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Unknown,
    Message,
}

impl Event {
    pub fn message(text: impl Into<String>, chat_id: i64, username: impl Into<String>) -> Self {
        Self::Message {
            text: text.into(),
            meta: MessageMeta {
                chat_id,
                username: username.into(),
            },
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::Message { .. } => EventKind::Message,
            Self::Unknown { .. } => EventKind::Unknown,
        }
    }

    /// Message text; empty for non-message events.
    pub fn text(&self) -> &str {
        match self {
            Self::Message { text, .. } => text,
            Self::Unknown { .. } => "",
        }
    }
}

/// Source of event batches. Owns the provider cursor.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch at most `limit` events. An empty batch is not an error.
    async fn fetch(&self, limit: usize) -> std::result::Result<Vec<Event>, EventError>;
}

/// Handler for a single event.
#[async_trait]
pub trait Processor: Send + Sync {
    async fn process(&self, event: Event) -> std::result::Result<(), EventError>;
}
