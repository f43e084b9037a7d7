use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// Scope of an exclusive lock over aggregate generation.
///
/// Pool-summary writes serialize per (child, pool); final-report writes and
/// review transitions serialize per child. Unrelated scopes never contend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockScope {
    Pool { child_id: Uuid, pool_id: Uuid },
    Child { child_id: Uuid },
}

/// Registry of keyed exclusive locks. Guards release on drop, so every exit
/// path — including failure — releases the scope.
#[derive(Default)]
pub struct KeyedLocks {
    entries: Mutex<HashMap<LockScope, Arc<AsyncMutex<()>>>>,
}

impl KeyedLocks {
    pub async fn acquire(&self, scope: LockScope) -> OwnedMutexGuard<()> {
        let entry = {
            let mut entries = self
                .entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            Arc::clone(entries.entry(scope).or_default())
        };
        entry.lock_owned().await
    }
}
