//! # readlater core
//!
//! Domain types, traits, and error definitions for the readlater bot.
//! This crate has **no async runtime dependency** — it defines the model that
//! the transport, storage, and bot crates implement against.
//!
//! ## Layout
//!
//! - [`transport`] — the messaging provider seen from the bot (updates in,
//!   replies out)
//! - [`storage`] — saved pages and the per-owner page store
//! - [`event`] — typed events plus the fetcher/processor seams used by the
//!   event loop
//! - [`error`] — one error enum per bounded context

pub mod error;
pub mod event;
pub mod storage;
pub mod transport;

// Re-export key types at crate root for ergonomics
pub use error::{CommandError, EventError, StorageError, TransportError};
pub use event::{Event, EventKind, Fetcher, MessageMeta, Processor};
pub use storage::{Page, PageStore};
pub use transport::{Chat, Message, Transport, Update, User};
