//! Per-conversation serialization.
//!
//! `ConversationLocks` is a keyed async mutex. Waiters on one key are served
//! in FIFO order (tokio's mutex is fair). The guard releases on drop, so every
//! exit path releases, including unwinding. The map entry for a key is removed
//! when the last guard for it drops and nobody waits.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::foundation::ConversationId;

type LockMap = HashMap<ConversationId, Arc<AsyncMutex<()>>>;

#[derive(Debug, Clone, Default)]
pub struct ConversationLocks {
    locks: Arc<Mutex<LockMap>>,
}

fn lock_map(map: &Mutex<LockMap>) -> MutexGuard<'_, LockMap> {
    map.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ConversationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until the conversation is free and claims it.
    pub async fn acquire(&self, conversation_id: &ConversationId) -> ConversationGuard {
        let mutex = {
            let mut map = lock_map(&self.locks);
            Arc::clone(
                map.entry(conversation_id.clone())
                    .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
            )
        };

        let guard = mutex.lock_owned().await;
        ConversationGuard {
            guard: Some(guard),
            conversation_id: conversation_id.clone(),
            locks: Arc::clone(&self.locks),
        }
    }

    /// Number of conversations currently held or waited on.
    pub fn active_count(&self) -> usize {
        lock_map(&self.locks).len()
    }
}

/// Exclusive claim on one conversation.
#[derive(Debug)]
pub struct ConversationGuard {
    guard: Option<OwnedMutexGuard<()>>,
    conversation_id: ConversationId,
    locks: Arc<Mutex<LockMap>>,
}

impl ConversationGuard {
    pub fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }
}

impl Drop for ConversationGuard {
    fn drop(&mut self) {
        // Release before inspecting the map so waiters are not counted twice.
        drop(self.guard.take());

        let mut map = lock_map(&self.locks);
        let unused = map
            .get(&self.conversation_id)
            .is_some_and(|mutex| Arc::strong_count(mutex) == 1);
        if unused {
            map.remove(&self.conversation_id);
        }
    }
}
