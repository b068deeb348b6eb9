//! Keyed asynchronous locks
//!
//! Capacity decisions are read-then-write: the confirmed count is read, the
//! limit is compared, and a status is persisted. Two concurrent admissions on
//! the same event could both observe room and both admit. Every operation
//! that reads or changes the confirmed count of an event therefore runs under
//! the lock for that event id; rating toggles use a lock per (event, user).
//! Operations on distinct keys never contend.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of async mutexes keyed by entity id
#[derive(Debug, Clone)]
pub struct LockRegistry<K> {
    locks: Arc<Mutex<HashMap<K, Arc<Mutex<()>>>>>,
}

impl<K> LockRegistry<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Acquire the lock for `key`, creating it on first use.
    ///
    /// The returned guard releases the lock when dropped.
    pub async fn acquire(&self, key: K) -> OwnedMutexGuard<()> {
        let entry = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(key)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        entry.lock_owned().await
    }
}

impl<K> Default for LockRegistry<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Locks serializing capacity-sensitive work per event id
pub type EventLocks = LockRegistry<i64>;

/// Locks serializing rating toggles per (event, user)
pub type RatingLocks = LockRegistry<(i64, i64)>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_key_serializes() {
        let locks: EventLocks = LockRegistry::new();
        let counter = Arc::new(Mutex::new(0i64));

        let mut handles = Vec::new();
        for _ in 0..32 {
            let locks = locks.clone();
            let counter = counter.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire(7).await;
                let mut value = counter.lock().await;
                let read = *value;
                tokio::task::yield_now().await;
                *value = read + 1;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(*counter.lock().await, 32);
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_block() {
        let locks: EventLocks = LockRegistry::new();

        let _held = locks.acquire(1).await;
        // Acquiring a different key must complete while key 1 is held.
        let other = tokio::time::timeout(std::time::Duration::from_secs(1), locks.acquire(2)).await;
        assert!(other.is_ok());
    }
}
