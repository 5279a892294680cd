//! Error types for the readlater domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; every variant that crosses a
//! component boundary names the operation that failed and keeps the
//! underlying cause reachable so callers can still match on it.

use thiserror::Error;

/// Failures talking to the messaging provider.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("{method} request failed: {reason}")]
    Http { method: String, reason: String },

    #[error("{method} rejected by provider (status {status}): {description}")]
    Api {
        method: String,
        status: u16,
        description: String,
    },

    #[error("Failed to decode {method} response: {reason}")]
    Decode { method: String, reason: String },

    #[error("Transport not configured: {0}")]
    NotConfigured(String),
}

/// Failures of the page store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The owner has nothing saved. Not a failure from the user's point of
    /// view; the bot answers it with a reply.
    #[error("no saved pages for user {owner}")]
    NoSavedPages { owner: String },

    #[error("Invalid owner name: {0:?}")]
    InvalidOwner(String),

    #[error("Page not found: {0}")]
    NotFound(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}: {reason}")]
    Serialization { context: String, reason: String },

    #[error("Storage not initialized: {0}")]
    NotInitialized(String),
}

impl StorageError {
    /// Wrap an I/O error with a short description of the operation.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn is_no_saved_pages(&self) -> bool {
        matches!(self, Self::NoSavedPages { .. })
    }
}

/// The failure behind an aborted command: either the store or the reply.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Errors produced while fetching or processing events.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("can't get events: {0}")]
    Fetch(#[source] TransportError),

    #[error("can't process event: unknown event type")]
    UnknownEventType,

    #[error("can't do command: {command}: {source}")]
    Command {
        command: &'static str,
        #[source]
        source: CommandError,
    },

    /// Replies of the stateless commands propagate as-is.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl EventError {
    pub fn command(command: &'static str, source: impl Into<CommandError>) -> Self {
        Self::Command {
            command,
            source: source.into(),
        }
    }

    /// The storage failure underneath this error, if any.
    pub fn storage_error(&self) -> Option<&StorageError> {
        match self {
            Self::Command {
                source: CommandError::Storage(e),
                ..
            } => Some(e),
            _ => None,
        }
    }

    /// The transport failure underneath this error, if any.
    pub fn transport_error(&self) -> Option<&TransportError> {
        match self {
            Self::Fetch(e) | Self::Transport(e) => Some(e),
            Self::Command {
                source: CommandError::Transport(e),
                ..
            } => Some(e),
            _ => None,
        }
    }
}
