//! Follow-Up Scheduler Port - one pending nudge per conversation.

use std::time::Duration;

use crate::domain::foundation::ConversationId;

/// Cancel-and-replace timers keyed by conversation.
pub trait FollowUpScheduler: Send + Sync {
    /// Replaces any pending follow-up for the conversation.
    fn schedule(&self, conversation_id: &ConversationId, delay: Duration);

    fn cancel(&self, conversation_id: &ConversationId);

    fn is_scheduled(&self, conversation_id: &ConversationId) -> bool;
}
