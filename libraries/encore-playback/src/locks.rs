//! Per-user operation serialization
//!
//! Transitions perform read-then-multi-write sequences against the
//! store (read the whole queue, compute new positions, write every
//! entry). Two interleaved `next` calls for the same user would both
//! read the same current index and advance to the same target, so every
//! mutating operation holds its user's lock for the full sequence.
//! Locks for different users are independent.

use dashmap::DashMap;
use encore_core::types::UserId;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-user async mutexes
#[derive(Default)]
pub(crate) struct UserLocks {
    locks: DashMap<UserId, Arc<Mutex<()>>>,
}

impl UserLocks {
    pub(crate) fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Acquire the mutation lock for a user, waiting if another
    /// operation for the same user is in flight
    pub(crate) async fn acquire(&self, user_id: &UserId) -> OwnedMutexGuard<()> {
        let lock = {
            // Scoped so the map shard guard is released before awaiting
            let entry = self.locks.entry(user_id.clone()).or_default();
            Arc::clone(entry.value())
        };
        lock.lock_owned().await
    }
}
