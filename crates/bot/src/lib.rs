//! The readlater bot: event source, command interpreter and event loop.
//!
//! ```text
//! Consumer ──fetch──▶ TelegramProcessor (Fetcher) ──▶ [Event]
//!    │
//!    └─ one task per event ──▶ TelegramProcessor (Processor)
//!                                   └─ commands ──▶ PageStore / Transport
//! ```

pub mod backoff;
pub mod commands;
pub mod consumer;
pub mod messages;
pub mod owner_lock;
pub mod processor;

#[cfg(test)]
mod test_support;

pub use backoff::Backoff;
pub use commands::{Command, is_url};
pub use consumer::{Consumer, ConsumerSettings, PollOutcome};
pub use processor::TelegramProcessor;
