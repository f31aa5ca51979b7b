//! Per-report async locks.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use tokio::sync::{Mutex, OwnedMutexGuard};

use roadwatch_core::storage::EntityId;

/// Registry of one async mutex per report id.
///
/// Holding the guard serializes fetch-check-update sequences on the same
/// report across every workflow invocation sharing this registry. Entries are
/// weak, so an id with no holder or waiter costs nothing once pruned.
#[derive(Debug, Default)]
pub struct TransitionLocks {
    locks: Mutex<HashMap<EntityId, Weak<Mutex<()>>>>,
}

impl TransitionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to the given report.
    pub async fn lock(&self, id: EntityId) -> OwnedMutexGuard<()> {
        let mutex = {
            let mut locks = self.locks.lock().await;
            match locks.get(&id).and_then(Weak::upgrade) {
                Some(mutex) => mutex,
                None => {
                    locks.retain(|_, lock| lock.strong_count() > 0);
                    let mutex = Arc::new(Mutex::new(()));
                    locks.insert(id, Arc::downgrade(&mutex));
                    mutex
                }
            }
        };

        mutex.lock_owned().await
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}
