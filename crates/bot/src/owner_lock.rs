//! Per-owner exclusive sections.
//!
//! Commands of one owner must not interleave (check-then-save and
//! pick-then-remove are two store calls each), while different owners run in
//! parallel. Each owner gets its own async mutex, created on first use.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OwnedMutexGuard;

#[derive(Default)]
pub struct OwnerLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl OwnerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for the owner's section; it is released when the guard drops.
    pub async fn lock(&self, owner: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Only the map holds idle locks; drop them so the map stays small.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(owner.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    /// Owners that currently hold or wait for their section.
    #[cfg(test)]
    fn active(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|lock| Arc::strong_count(lock) > 1)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn same_owner_is_serialized() {
        let locks = Arc::new(OwnerLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..5 {
            let locks = Arc::clone(&locks);
            let inside = Arc::clone(&inside);
            let max_inside = Arc::clone(&max_inside);
            handles.push(tokio::spawn(async move {
                let _guard = locks.lock("bob").await;
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_inside.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_owners_do_not_block() {
        let locks = OwnerLocks::new();
        let _bob = locks.lock("bob").await;
        let alice = tokio::time::timeout(Duration::from_millis(100), locks.lock("alice")).await;
        assert!(alice.is_ok());
    }

    #[tokio::test]
    async fn idle_locks_are_dropped() {
        let locks = OwnerLocks::new();
        {
            let _bob = locks.lock("bob").await;
            assert_eq!(locks.active(), 1);
        }
        assert_eq!(locks.active(), 0);
        let _alice = locks.lock("alice").await;
        assert_eq!(locks.locks.lock().unwrap().len(), 1);
    }
}
