//! Keyed execution locks
//!
//! Serialises work on the same report (or repository) inside one process.
//! Entries are created on demand and removed when the last holder or waiter
//! lets go, so the table only ever holds keys that are in use.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockTable = HashMap<String, Arc<Mutex<()>>>;

#[derive(Debug, Clone, Default)]
pub struct ReportLocks {
    table: Arc<StdMutex<LockTable>>,
}

/// Held for as long as the caller owns the key
#[derive(Debug)]
pub struct ReportLockGuard {
    key: String,
    table: Arc<StdMutex<LockTable>>,
    entry: Arc<Mutex<()>>,
    _guard: OwnedMutexGuard<()>,
}

fn table(locks: &StdMutex<LockTable>) -> MutexGuard<'_, LockTable> {
    // The table is never left half-updated, so a poisoned lock is still usable
    locks.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ReportLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, key: &str) -> Arc<Mutex<()>> {
        Arc::clone(
            table(&self.table)
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    /// Wait until `key` is free and take it
    pub async fn lock(&self, key: &str) -> ReportLockGuard {
        let entry = self.entry(key);
        let guard = Arc::clone(&entry).lock_owned().await;
        ReportLockGuard {
            key: key.to_string(),
            table: Arc::clone(&self.table),
            entry,
            _guard: guard,
        }
    }

    /// Keys currently held or awaited
    pub fn len(&self) -> usize {
        table(&self.table).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for ReportLockGuard {
    fn drop(&mut self) {
        let mut table = table(&self.table);
        // Table entry, `self.entry` and the owned guard; anything more is a waiter
        if Arc::strong_count(&self.entry) <= 3 {
            table.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_lock_is_exclusive_per_key() {
        let locks = ReportLocks::new();
        let held = locks.lock("r1").await;

        // A different key is free straight away
        let other = tokio::time::timeout(Duration::from_millis(100), locks.lock("r2"))
            .await
            .unwrap();
        assert_eq!(locks.len(), 2);
        assert!(
            tokio::time::timeout(Duration::from_millis(20), locks.lock("r1"))
                .await
                .is_err()
        );

        drop(other);
        drop(held);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_waiter_acquires_after_release() {
        let locks = ReportLocks::new();
        let held = locks.lock("r1").await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.lock("r1").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());
        assert_eq!(locks.len(), 1);

        drop(held);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(locks.is_empty());
    }
}
