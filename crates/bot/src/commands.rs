//! Command interpreter: maps message text to an action against the store
//! and sends the reply.

use readlater_core::error::{CommandError, EventError};
use readlater_core::storage::Page;
use tracing::info;

use crate::messages;
use crate::processor::TelegramProcessor;

const RND_CMD: &str = "/rnd";
const HELP_CMD: &str = "/help";
const START_CMD: &str = "/start";

/// What a message asks the bot to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Save(String),
    Random,
    Help,
    Start,
    Unknown,
}

impl Command {
    /// Classify message text. Links win over the fixed vocabulary.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if is_url(text) {
            return Self::Save(text.to_string());
        }
        match text {
            RND_CMD => Self::Random,
            HELP_CMD => Self::Help,
            START_CMD => Self::Start,
            _ => Self::Unknown,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Save(_) => "save",
            Self::Random => "rnd",
            Self::Help => "help",
            Self::Start => "start",
            Self::Unknown => "unknown",
        }
    }
}

/// An absolute URL with a non-empty host.
pub fn is_url(text: &str) -> bool {
    // The parser tolerates "http:foo.io" and "https:/foo.io"; require an authority.
    let Some((_, rest)) = text.split_once(':') else {
        return false;
    };
    if !rest.starts_with("//") {
        return false;
    }
    reqwest::Url::parse(text)
        .ok()
        .and_then(|url| url.host_str().map(|host| !host.is_empty()))
        .unwrap_or(false)
}

impl TelegramProcessor {
    pub(crate) async fn do_cmd(
        &self,
        text: &str,
        chat_id: i64,
        owner: &str,
    ) -> Result<(), EventError> {
        let command = Command::parse(text);
        info!(owner, command = command.name(), "Got new command");

        match command {
            Command::Save(url) => self
                .save_page(chat_id, &url, owner)
                .await
                .map_err(|e| EventError::command("save page", e)),
            Command::Random => self
                .send_random(chat_id, owner)
                .await
                .map_err(|e| EventError::command("send random", e)),
            Command::Help => self.reply(chat_id, messages::HELP).await,
            Command::Start => self.reply(chat_id, &messages::hello()).await,
            Command::Unknown => self.reply(chat_id, messages::UNKNOWN_COMMAND).await,
        }
    }

    async fn reply(&self, chat_id: i64, text: &str) -> Result<(), EventError> {
        Ok(self.transport.send_message(chat_id, text).await?)
    }

    async fn save_page(&self, chat_id: i64, url: &str, owner: &str) -> Result<(), CommandError> {
        let page = Page::new(url, owner);

        if self.storage.exists(&page).await? {
            self.transport
                .send_message(chat_id, messages::ALREADY_EXISTS)
                .await?;
            return Ok(());
        }

        self.storage.save(&page).await?;
        self.transport.send_message(chat_id, messages::SAVED).await?;
        Ok(())
    }

    async fn send_random(&self, chat_id: i64, owner: &str) -> Result<(), CommandError> {
        let page = match self.storage.pick_random(owner).await {
            Ok(page) => page,
            Err(e) if e.is_no_saved_pages() => {
                self.transport
                    .send_message(chat_id, messages::NO_SAVED_PAGES)
                    .await?;
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        // The page goes away only once the user has it.
        self.transport.send_message(chat_id, &page.url).await?;
        self.storage.remove(&page).await?;
        Ok(())
    }
}
