//! Telegram event source and event handler.
//!
//! [`TelegramProcessor`] is both halves of the pipeline the consumer drives:
//! as a [`Fetcher`] it turns provider updates into events and owns the
//! update cursor, as a [`Processor`] it routes message events to the command
//! interpreter (see `commands.rs`).

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use readlater_core::error::EventError;
use readlater_core::event::{Event, Fetcher, MessageMeta, Processor};
use readlater_core::storage::PageStore;
use readlater_core::transport::{Message, Transport, Update};
use tracing::debug;

use crate::owner_lock::OwnerLocks;

pub struct TelegramProcessor {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) storage: Arc<dyn PageStore>,
    offset: AtomicI64,
    locks: OwnerLocks,
}

impl TelegramProcessor {
    pub fn new(transport: Arc<dyn Transport>, storage: Arc<dyn PageStore>) -> Self {
        Self {
            transport,
            storage,
            offset: AtomicI64::new(0),
            locks: OwnerLocks::new(),
        }
    }

    /// The next update id to ask the provider for.
    pub fn offset(&self) -> i64 {
        self.offset.load(Ordering::Acquire)
    }

    async fn process_message(&self, text: &str, meta: MessageMeta) -> Result<(), EventError> {
        let _section = self.locks.lock(&meta.username).await;
        self.do_cmd(text, meta.chat_id, &meta.username).await
    }
}

/// Who a message's pages belong to.
///
/// The sender's username when set, otherwise `id<user id>`, otherwise
/// `chat<chat id>` for messages without a sender.
pub fn owner_of(message: &Message) -> String {
    match &message.from {
        Some(user) => match user.username.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("id{}", user.id),
        },
        None => format!("chat{}", message.chat.id),
    }
}

pub fn to_event(update: Update) -> Event {
    match update.message {
        Some(message) => {
            let username = owner_of(&message);
            Event::Message {
                text: message.text.unwrap_or_default(),
                meta: MessageMeta {
                    chat_id: message.chat.id,
                    username,
                },
            }
        }
        None => Event::Unknown {
            update_id: update.id,
        },
    }
}

#[async_trait]
impl Fetcher for TelegramProcessor {
    async fn fetch(&self, limit: usize) -> Result<Vec<Event>, EventError> {
        let offset = self.offset();
        let updates = self
            .transport
            .fetch_updates(offset, limit)
            .await
            .map_err(EventError::Fetch)?;

        let Some(last) = updates.iter().map(|u| u.id).max() else {
            return Ok(Vec::new());
        };

        let events: Vec<Event> = updates.into_iter().map(to_event).collect();

        // Only ever moves forward, even if the provider replays old ids.
        self.offset.fetch_max(last + 1, Ordering::AcqRel);
        debug!(count = events.len(), offset = self.offset(), "Fetched events");

        Ok(events)
    }
}

#[async_trait]
impl Processor for TelegramProcessor {
    async fn process(&self, event: Event) -> Result<(), EventError> {
        match event {
            Event::Message { text, meta } => self.process_message(&text, meta).await,
            Event::Unknown { update_id } => {
                debug!(update_id, "Skipping non-message update");
                Err(EventError::UnknownEventType)
            }
        }
    }
}
