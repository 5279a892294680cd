//! Telegram Bot API client.
//!
//! Implements the core `Transport` trait with plain HTTPS calls:
//! `getUpdates` for polling, `sendMessage` for replies and `getMe` for the
//! health check. Every response is the Bot API envelope
//! `{ "ok": bool, "result": T, "description": "..." }`.

use std::time::Duration;

use async_trait::async_trait;
use readlater_core::error::TransportError;
use readlater_core::transport::{Transport, Update};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

/// Longest provider error body kept in an error message.
const MAX_ERROR_BODY: usize = 256;

/// Telegram client configuration.
#[derive(Clone)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    pub bot_token: String,
    /// API host, optionally with a scheme (defaults to https).
    pub api_host: String,
    /// `getUpdates` long-poll timeout in seconds; 0 disables long polling.
    pub long_poll_timeout_secs: u32,
    /// Timeout applied to every request.
    pub request_timeout: Duration,
}

impl TelegramConfig {
    /// Build from the `[telegram]` settings plus a resolved token.
    pub fn from_settings(
        bot_token: impl Into<String>,
        settings: &readlater_config::TelegramConfig,
    ) -> Self {
        Self {
            bot_token: bot_token.into(),
            api_host: settings.api_host.clone(),
            long_poll_timeout_secs: settings.long_poll_timeout_secs,
            request_timeout: Duration::from_secs(settings.request_timeout_secs),
        }
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"[REDACTED]")
            .field("api_host", &self.api_host)
            .field("long_poll_timeout_secs", &self.long_poll_timeout_secs)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// The bot's own account, as returned by `getMe`.
#[derive(Debug, Clone, Deserialize)]
pub struct BotIdentity {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<u16>,
}

/// Telegram transport.
pub struct TelegramClient {
    config: TelegramConfig,
    base_url: String,
    client: reqwest::Client,
}

impl TelegramClient {
    pub fn new(config: TelegramConfig) -> Result<Self, TransportError> {
        if config.bot_token.trim().is_empty() {
            return Err(TransportError::NotConfigured("empty bot token".into()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::NotConfigured(format!("HTTP client: {e}")))?;

        let host = config.api_host.trim_end_matches('/');
        let base_url = if host.contains("://") {
            host.to_string()
        } else {
            format!("https://{host}")
        };

        Ok(Self {
            config,
            base_url,
            client,
        })
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.base_url, self.config.bot_token)
    }

    /// Call a Bot API method with a JSON body and decode its `result`.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T, TransportError> {
        let resp = self
            .client
            .post(self.api_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Http {
                method: method.into(),
                // The URL carries the token; keep it out of errors and logs.
                reason: e.without_url().to_string(),
            })?;

        let status = resp.status().as_u16();
        let text = resp.text().await.map_err(|e| TransportError::Http {
            method: method.into(),
            reason: e.without_url().to_string(),
        })?;

        trace!(method, status, len = text.len(), "Telegram response");
        decode_response(method, status, &text)
    }

    /// Fetch the bot's own account.
    pub async fn get_me(&self) -> Result<BotIdentity, TransportError> {
        self.call("getMe", &serde_json::json!({})).await
    }
}

/// Decode a Bot API envelope, mapping provider failures to `TransportError`.
fn decode_response<T: DeserializeOwned>(
    method: &str,
    status: u16,
    body: &str,
) -> Result<T, TransportError> {
    let success = (200..300).contains(&status);

    let envelope: ApiResponse<T> = match serde_json::from_str(body) {
        Ok(env) => env,
        Err(e) if success => {
            return Err(TransportError::Decode {
                method: method.into(),
                reason: e.to_string(),
            });
        }
        Err(_) => {
            return Err(TransportError::Api {
                method: method.into(),
                status,
                description: truncate(body, MAX_ERROR_BODY),
            });
        }
    };

    if !envelope.ok || !success {
        return Err(TransportError::Api {
            method: method.into(),
            status: envelope.error_code.unwrap_or(status),
            description: envelope
                .description
                .unwrap_or_else(|| "no description".into()),
        });
    }

    envelope.result.ok_or_else(|| TransportError::Decode {
        method: method.into(),
        reason: "response has no result".into(),
    })
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &s[..end])
}

#[async_trait]
impl Transport for TelegramClient {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn fetch_updates(
        &self,
        offset: i64,
        limit: usize,
    ) -> Result<Vec<Update>, TransportError> {
        let body = serde_json::json!({
            "offset": offset,
            "limit": limit,
            "timeout": self.config.long_poll_timeout_secs,
        });

        let updates: Vec<Update> = self.call("getUpdates", &body).await?;
        debug!(offset, limit, count = updates.len(), "Fetched updates");
        Ok(updates)
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });

        let _: serde_json::Value = self.call("sendMessage", &body).await?;
        debug!(chat_id, len = text.len(), "Message sent");
        Ok(())
    }

    async fn health_check(&self) -> Result<(), TransportError> {
        let me = self.get_me().await?;
        debug!(bot_id = me.id, username = ?me.username, "getMe succeeded");
        Ok(())
    }
}
