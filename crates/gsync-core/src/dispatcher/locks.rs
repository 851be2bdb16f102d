//! Per-entity serialization.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Async mutexes keyed by entity id.
///
/// Events for the same entity run one at a time in arrival order of lock
/// acquisition; events for different entities never wait on each other.
/// Idle entries are pruned on the next acquisition.
#[derive(Default)]
pub struct EntityLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl EntityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `entity_id`.
    pub async fn acquire(&self, entity_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.retain(|id, lock| id == entity_id || Arc::strong_count(lock) > 1);
            locks.entry(entity_id.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Number of tracked entity ids.
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_entity_waits() {
        let locks = Arc::new(EntityLocks::new());
        let entered = Arc::new(AtomicBool::new(false));

        let guard = locks.acquire("42").await;

        let task = {
            let locks = locks.clone();
            let entered = entered.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire("42").await;
                entered.store(true, Ordering::SeqCst);
            })
        };

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!entered.load(Ordering::SeqCst));

        drop(guard);
        task.await.unwrap();
        assert!(entered.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_different_entities_do_not_block() {
        let locks = EntityLocks::new();
        let _a = locks.acquire("1").await;
        let acquired = tokio::time::timeout(Duration::from_millis(100), locks.acquire("2")).await;
        assert!(acquired.is_ok());
    }

    #[tokio::test]
    async fn test_idle_locks_are_pruned() {
        let locks = EntityLocks::new();
        drop(locks.acquire("1").await);
        drop(locks.acquire("2").await);
        let _held = locks.acquire("3").await;

        assert_eq!(locks.len(), 1);
    }
}
