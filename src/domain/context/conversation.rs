//! Per-conversation state: identity, mode, mood, and a bounded history.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use crate::domain::foundation::{ConversationId, HandoffId, Timestamp, UserId};

use super::message::ContextMessage;

/// Default number of history entries kept per conversation.
pub const DEFAULT_HISTORY_WINDOW: usize = 20;

/// Who currently answers the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConversationMode {
    #[default]
    Ai,
    Human,
}

/// Customer mood as last measured by the emotional detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionalState {
    Positive,
    #[default]
    Neutral,
    Frustrated,
    Angry,
}

impl EmotionalState {
    /// Ordering from calm to hostile, used for trend detection.
    pub fn severity_rank(&self) -> u8 {
        match self {
            EmotionalState::Positive => 0,
            EmotionalState::Neutral => 1,
            EmotionalState::Frustrated => 2,
            EmotionalState::Angry => 3,
        }
    }

    pub fn is_negative(&self) -> bool {
        matches!(self, EmotionalState::Frustrated | EmotionalState::Angry)
    }
}

impl fmt::Display for EmotionalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EmotionalState::Positive => "positive",
            EmotionalState::Neutral => "neutral",
            EmotionalState::Frustrated => "frustrated",
            EmotionalState::Angry => "angry",
        };
        write!(f, "{}", s)
    }
}

/// Values used when a context is created lazily.
#[derive(Debug, Clone)]
pub struct ContextDefaults {
    pub user_id: UserId,
    pub platform: String,
    /// Lifetime granted on every activity.
    pub ttl_secs: u64,
}

impl ContextDefaults {
    pub fn new(user_id: UserId, platform: impl Into<String>, ttl_secs: u64) -> Self {
        Self {
            user_id,
            platform: platform.into(),
            ttl_secs,
        }
    }
}

/// Everything the desk remembers about one conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    pub conversation_id: ConversationId,
    pub user_id: UserId,
    pub platform: String,
    pub session_started: Timestamp,
    pub last_activity: Timestamp,
    pub expires_at: Timestamp,
    pub ttl_secs: u64,
    pub mode: ConversationMode,
    pub emotional_state: EmotionalState,
    pub suspect_ai: bool,
    pub message_history: VecDeque<ContextMessage>,
    /// Set once the off-hours auto-reply went out in this session.
    pub off_hours_notified: bool,
    /// Consecutive off-topic messages.
    pub off_topic_count: u32,
    /// Attachment ids already delivered in this conversation.
    pub sent_resources: BTreeSet<String>,
    pub active_handoff_id: Option<HandoffId>,
}

impl ConversationContext {
    /// Creates a fresh context in AI mode.
    pub fn new(conversation_id: ConversationId, defaults: &ContextDefaults, now: Timestamp) -> Self {
        Self {
            conversation_id,
            user_id: defaults.user_id.clone(),
            platform: defaults.platform.clone(),
            session_started: now,
            last_activity: now,
            expires_at: now.plus_secs(defaults.ttl_secs),
            ttl_secs: defaults.ttl_secs,
            mode: ConversationMode::Ai,
            emotional_state: EmotionalState::Neutral,
            suspect_ai: false,
            message_history: VecDeque::new(),
            off_hours_notified: false,
            off_topic_count: 0,
            sent_resources: BTreeSet::new(),
            active_handoff_id: None,
        }
    }

    /// Refreshes activity and pushes the expiry forward.
    pub fn touch(&mut self, now: Timestamp) {
        self.last_activity = now;
        self.expires_at = now.plus_secs(self.ttl_secs);
    }

    /// Appends a message and drops the oldest entries beyond `window`.
    pub fn push_message(&mut self, message: ContextMessage, window: usize) {
        self.message_history.push_back(message);
        while self.message_history.len() > window {
            self.message_history.pop_front();
        }
    }

    pub fn is_human_mode(&self) -> bool {
        self.mode == ConversationMode::Human
    }

    /// True if the agent already said something in this conversation.
    pub fn has_assistant_messages(&self) -> bool {
        self.message_history.iter().any(|m| m.is_assistant())
    }

    /// Most recent `n` messages, oldest first.
    pub fn recent_messages(&self, n: usize) -> Vec<&ContextMessage> {
        let skip = self.message_history.len().saturating_sub(n);
        self.message_history.iter().skip(skip).collect()
    }

    pub fn last_user_message(&self) -> Option<&ContextMessage> {
        self.message_history.iter().rev().find(|m| m.is_user())
    }
}

/// Partial update merged into a stored context.
///
/// `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ContextUpdate {
    pub user_id: Option<UserId>,
    pub platform: Option<String>,
    pub mode: Option<ConversationMode>,
    pub emotional_state: Option<EmotionalState>,
    pub suspect_ai: Option<bool>,
    pub off_hours_notified: Option<bool>,
    pub off_topic_count: Option<u32>,
    pub active_handoff_id: Option<Option<HandoffId>>,
    /// Attachment id to add to `sent_resources`.
    pub sent_resource: Option<String>,
}

impl ContextUpdate {
    pub fn mode(mode: ConversationMode) -> Self {
        Self {
            mode: Some(mode),
            ..Default::default()
        }
    }

    pub fn with_active_handoff(mut self, handoff_id: Option<HandoffId>) -> Self {
        self.active_handoff_id = Some(handoff_id);
        self
    }

    /// Merges the set fields and refreshes activity.
    pub fn apply_to(self, context: &mut ConversationContext, now: Timestamp) {
        if let Some(user_id) = self.user_id {
            context.user_id = user_id;
        }
        if let Some(platform) = self.platform {
            context.platform = platform;
        }
        if let Some(mode) = self.mode {
            context.mode = mode;
        }
        if let Some(state) = self.emotional_state {
            context.emotional_state = state;
        }
        if let Some(suspect) = self.suspect_ai {
            context.suspect_ai = suspect;
        }
        if let Some(notified) = self.off_hours_notified {
            context.off_hours_notified = notified;
        }
        if let Some(count) = self.off_topic_count {
            context.off_topic_count = count;
        }
        if let Some(handoff_id) = self.active_handoff_id {
            context.active_handoff_id = handoff_id;
        }
        if let Some(resource) = self.sent_resource {
            context.sent_resources.insert(resource);
        }
        context.touch(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::message::HandledBy;

    fn context() -> ConversationContext {
        let defaults = ContextDefaults::new(UserId::new("u-1").unwrap(), "telegram", 3600);
        ConversationContext::new(
            ConversationId::new("c-1").unwrap(),
            &defaults,
            Timestamp::from_unix_secs(1_000),
        )
    }

    #[test]
    fn new_context_starts_in_ai_mode() {
        let ctx = context();
        assert_eq!(ctx.mode, ConversationMode::Ai);
        assert_eq!(ctx.emotional_state, EmotionalState::Neutral);
        assert_eq!(ctx.expires_at.as_unix_secs(), 4_600);
    }

    #[test]
    fn push_message_keeps_most_recent_in_order() {
        let mut ctx = context();
        for i in 0..5 {
            ctx.push_message(ContextMessage::user(format!("m{}", i), HandledBy::Ai), 3);
        }
        let texts: Vec<_> = ctx.message_history.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["m2", "m3", "m4"]);
    }

    #[test]
    fn update_merges_only_set_fields() {
        let mut ctx = context();
        ContextUpdate {
            mode: Some(ConversationMode::Human),
            ..Default::default()
        }
        .apply_to(&mut ctx, Timestamp::from_unix_secs(2_000));

        assert_eq!(ctx.mode, ConversationMode::Human);
        assert_eq!(ctx.platform, "telegram");
        assert_eq!(ctx.last_activity.as_unix_secs(), 2_000);
        assert_eq!(ctx.expires_at.as_unix_secs(), 5_600);
    }

    #[test]
    fn emotional_rank_orders_calm_to_hostile() {
        assert!(EmotionalState::Angry.severity_rank() > EmotionalState::Frustrated.severity_rank());
        assert!(EmotionalState::Neutral.severity_rank() > EmotionalState::Positive.severity_rank());
        assert!(EmotionalState::Frustrated.is_negative());
        assert!(!EmotionalState::Positive.is_negative());
    }

    #[test]
    fn recent_messages_returns_tail() {
        let mut ctx = context();
        for i in 0..4 {
            ctx.push_message(ContextMessage::user(format!("m{}", i), HandledBy::Ai), 20);
        }
        let tail: Vec<_> = ctx.recent_messages(2).iter().map(|m| m.text.clone()).collect();
        assert_eq!(tail, vec!["m2", "m3"]);
    }
}
