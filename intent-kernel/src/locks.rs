//! Per-record write serialisation.

use std::collections::HashMap;
use std::sync::Arc;

use intent_primitives::RecordId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Hands out one async mutex per record identifier.
///
/// Writers for the same record queue behind each other; writers for different
/// records proceed independently. Idle entries are dropped on the next acquire.
#[derive(Debug, Default)]
pub struct RecordLocks {
    locks: Mutex<HashMap<RecordId, Arc<Mutex<()>>>>,
}

impl RecordLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `record_id`.
    pub async fn acquire(&self, record_id: RecordId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut table = self.locks.lock().await;
            table.retain(|id, lock| *id == record_id || Arc::strong_count(lock) > 1);
            Arc::clone(table.entry(record_id).or_default())
        };
        lock.lock_owned().await
    }

    /// Number of identifiers currently tracked.
    pub async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}
