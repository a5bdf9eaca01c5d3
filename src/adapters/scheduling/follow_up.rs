//! Tokio follow-up scheduler.
//!
//! One sleeping task per conversation. Scheduling again aborts the previous
//! task through its `AbortHandle`. A timer that fires sends the conversation
//! id down an unbounded channel; whoever owns the receiver decides what to say.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::domain::foundation::ConversationId;
use crate::ports::FollowUpScheduler;

#[derive(Debug)]
struct Pending {
    generation: u64,
    handle: AbortHandle,
}

#[derive(Debug, Default)]
struct Timers {
    next_generation: u64,
    pending: HashMap<ConversationId, Pending>,
}

#[derive(Debug, Clone)]
pub struct TokioFollowUpScheduler {
    timers: Arc<Mutex<Timers>>,
    fired: mpsc::UnboundedSender<ConversationId>,
}

fn lock(timers: &Mutex<Timers>) -> MutexGuard<'_, Timers> {
    timers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl TokioFollowUpScheduler {
    /// Returns the scheduler and the receiver of fired conversation ids.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ConversationId>) {
        let (fired, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            timers: Arc::new(Mutex::new(Timers::default())),
            fired,
        };
        (scheduler, rx)
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.timers).pending.len()
    }
}

impl FollowUpScheduler for TokioFollowUpScheduler {
    fn schedule(&self, conversation_id: &ConversationId, delay: Duration) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(%conversation_id, "No tokio runtime, follow-up not scheduled");
            return;
        };

        let mut timers = lock(&self.timers);
        timers.next_generation += 1;
        let generation = timers.next_generation;

        let task_timers = Arc::clone(&self.timers);
        let fired = self.fired.clone();
        let id = conversation_id.clone();
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut timers = lock(&task_timers);
                if timers.pending.get(&id).map(|p| p.generation) == Some(generation) {
                    timers.pending.remove(&id);
                }
            }
            if fired.send(id.clone()).is_err() {
                tracing::debug!(conversation_id = %id, "Follow-up receiver dropped");
            }
        });

        let replaced = timers.pending.insert(
            conversation_id.clone(),
            Pending {
                generation,
                handle: task.abort_handle(),
            },
        );
        if let Some(previous) = replaced {
            previous.handle.abort();
        }
    }

    fn cancel(&self, conversation_id: &ConversationId) {
        if let Some(pending) = lock(&self.timers).pending.remove(conversation_id) {
            pending.handle.abort();
        }
    }

    fn is_scheduled(&self, conversation_id: &ConversationId) -> bool {
        lock(&self.timers).pending.contains_key(conversation_id)
    }
}
