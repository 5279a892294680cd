//! Mock transport and store shared by the unit tests of this crate.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use readlater_core::error::{StorageError, TransportError};
use readlater_core::storage::{Page, PageStore};
use readlater_core::transport::{Transport, Update};
use readlater_storage::InMemoryBackend;

/// A transport that replays scripted fetch results and records replies.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Result<Vec<Update>, TransportError>>>,
    offsets: Mutex<Vec<i64>>,
    sent: Mutex<Vec<(i64, String)>>,
    fail_send: AtomicBool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_batch(&self, updates: Vec<Update>) {
        self.script.lock().unwrap().push_back(Ok(updates));
    }

    pub fn push_error(&self) {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(TransportError::Http {
                method: "getUpdates".into(),
                reason: "connection refused".into(),
            }));
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail_send.store(fail, Ordering::SeqCst);
    }

    /// Offsets passed to every `fetch_updates` call so far.
    pub fn offsets(&self) -> Vec<i64> {
        self.offsets.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|(_, text)| text).collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_updates(
        &self,
        offset: i64,
        _limit: usize,
    ) -> Result<Vec<Update>, TransportError> {
        self.offsets.lock().unwrap().push(offset);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(TransportError::Api {
                method: "sendMessage".into(),
                status: 400,
                description: "Bad Request: chat not found".into(),
            });
        }
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}

/// In-memory store that counts mutations and can be told to fail or stall.
#[derive(Default)]
pub struct RecordingStore {
    inner: InMemoryBackend,
    saves: AtomicUsize,
    removes: AtomicUsize,
    fail_all: AtomicBool,
    fail_remove: AtomicBool,
    exists_delay: Mutex<Option<Duration>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn removes(&self) -> usize {
        self.removes.load(Ordering::SeqCst)
    }

    pub fn fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    /// Fail only `remove`, leaving reads and saves working.
    pub fn fail_removes(&self, fail: bool) {
        self.fail_remove.store(fail, Ordering::SeqCst);
    }

    /// Make `exists` yield for a while, widening any check-then-save race.
    pub fn slow_exists(&self, delay: Duration) {
        *self.exists_delay.lock().unwrap() = Some(delay);
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(StorageError::io(
                "disk unavailable",
                std::io::Error::other("injected failure"),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl PageStore for RecordingStore {
    fn name(&self) -> &str {
        "recording"
    }

    async fn save(&self, page: &Page) -> Result<(), StorageError> {
        self.check()?;
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save(page).await
    }

    async fn pick_random(&self, owner: &str) -> Result<Page, StorageError> {
        self.check()?;
        self.inner.pick_random(owner).await
    }

    async fn remove(&self, page: &Page) -> Result<(), StorageError> {
        self.check()?;
        if self.fail_remove.load(Ordering::SeqCst) {
            return Err(StorageError::io(
                "cannot delete page file",
                std::io::Error::other("injected failure"),
            ));
        }
        self.removes.fetch_add(1, Ordering::SeqCst);
        self.inner.remove(page).await
    }

    async fn exists(&self, page: &Page) -> Result<bool, StorageError> {
        self.check()?;
        let delay = *self.exists_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.exists(page).await
    }

    async fn count(&self, owner: &str) -> Result<usize, StorageError> {
        self.check()?;
        self.inner.count(owner).await
    }
}
