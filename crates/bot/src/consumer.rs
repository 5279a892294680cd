//! The event loop.
//!
//! Pulls a batch from the [`Fetcher`], runs every event of the batch in its
//! own task, waits for the whole batch, then fetches again:
//!
//! 1. **Fetch** — on error, log and sleep per the [`Backoff`] policy
//! 2. **Idle** — empty batch, sleep for the idle interval
//! 3. **Dispatch** — one task per event; failures and panics are logged and
//!    never stop the loop

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use readlater_config::ConsumerConfig;
use readlater_core::error::EventError;
use readlater_core::event::{Event, Fetcher, Processor};
use tracing::{debug, error, info, warn};

use crate::backoff::Backoff;

/// Loop tuning, usually derived from `[consumer]` in the config file.
#[derive(Debug, Clone)]
pub struct ConsumerSettings {
    pub batch_size: usize,
    pub idle_interval: Duration,
    pub backoff: Backoff,
}

impl ConsumerSettings {
    pub fn from_config(config: &ConsumerConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            idle_interval: Duration::from_millis(config.idle_interval_ms),
            backoff: Backoff::from_config(&config.backoff),
        }
    }
}

impl Default for ConsumerSettings {
    fn default() -> Self {
        Self::from_config(&ConsumerConfig::default())
    }
}

/// What one loop iteration did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The fetch failed; the loop waits `retry_in` before the next one.
    FetchFailed { retry_in: Duration },
    /// Nothing new.
    Idle,
    /// A batch was handled; `failed` events returned an error or panicked.
    Dispatched { events: usize, failed: usize },
}

pub struct Consumer {
    fetcher: Arc<dyn Fetcher>,
    processor: Arc<dyn Processor>,
    settings: ConsumerSettings,
}

impl Consumer {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        processor: Arc<dyn Processor>,
        settings: ConsumerSettings,
    ) -> Self {
        Self {
            fetcher,
            processor,
            settings,
        }
    }

    /// Run one iteration without sleeping afterwards.
    pub async fn poll_once(&mut self) -> PollOutcome {
        let fetched = self.fetcher.fetch(self.settings.batch_size).await;
        self.handle_fetched(fetched).await
    }

    /// Run forever.
    pub async fn start(self) {
        self.start_with_shutdown(std::future::pending()).await
    }

    /// Run until `shutdown` resolves.
    ///
    /// Shutdown is observed while fetching and while sleeping. A batch that
    /// is already being dispatched always runs to completion.
    pub async fn start_with_shutdown<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(
            batch_size = self.settings.batch_size,
            idle_ms = self.settings.idle_interval.as_millis() as u64,
            "Consumer started"
        );

        loop {
            let fetched = tokio::select! {
                biased;
                _ = &mut shutdown => break,
                fetched = self.fetcher.fetch(self.settings.batch_size) => fetched,
            };

            let pause = match self.handle_fetched(fetched).await {
                PollOutcome::FetchFailed { retry_in } => retry_in,
                PollOutcome::Idle => self.settings.idle_interval,
                PollOutcome::Dispatched { .. } => continue,
            };

            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(pause) => {}
            }
        }

        info!("Consumer stopped");
    }

    async fn handle_fetched(&mut self, fetched: Result<Vec<Event>, EventError>) -> PollOutcome {
        let events = match fetched {
            Ok(events) => {
                self.settings.backoff.reset();
                events
            }
            Err(e) => {
                let retry_in = self.settings.backoff.next_delay();
                error!(
                    error = %e,
                    attempt = self.settings.backoff.attempts(),
                    retry_in_ms = retry_in.as_millis() as u64,
                    "Consumer fetch failed"
                );
                return PollOutcome::FetchFailed { retry_in };
            }
        };

        if events.is_empty() {
            return PollOutcome::Idle;
        }

        let count = events.len();
        let failed = self.handle_events(events).await;
        if failed > 0 {
            warn!(events = count, failed, "Batch handled with failures");
        } else {
            debug!(events = count, "Batch handled");
        }

        PollOutcome::Dispatched {
            events: count,
            failed,
        }
    }

    /// Run every event in its own task and wait for all of them.
    /// Returns how many failed.
    async fn handle_events(&self, events: Vec<Event>) -> usize {
        let handles: Vec<_> = events
            .into_iter()
            .map(|event| {
                let processor = Arc::clone(&self.processor);
                tokio::spawn(async move {
                    debug!(kind = ?event.kind(), "Got new event");
                    processor.process(event).await
                })
            })
            .collect();

        let mut failed = 0;
        for result in join_all(handles).await {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    failed += 1;
                    error!(error = %e, "Can't handle event");
                }
                Err(e) => {
                    failed += 1;
                    error!(error = %e, "Event handler panicked");
                }
            }
        }
        failed
    }
}
