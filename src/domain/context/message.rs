//! Messages recorded in a conversation's rolling history.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MessageId, Timestamp};

/// Who authored a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// Which side of the desk produced or consumed the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandledBy {
    /// Generated (or answered) by the automated agent.
    Ai,
    /// Arrived or was sent while a human operator owned the conversation.
    Human,
    /// Canned reply from a deterministic script.
    Script,
    /// Internal bookkeeping.
    System,
}

/// One immutable entry in the conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextMessage {
    pub id: MessageId,
    pub timestamp: Timestamp,
    pub role: MessageRole,
    pub text: String,
    pub handled_by: HandledBy,
}

impl ContextMessage {
    /// Creates a message stamped with the current time.
    pub fn new(role: MessageRole, text: impl Into<String>, handled_by: HandledBy) -> Self {
        Self {
            id: MessageId::new(),
            timestamp: Timestamp::now(),
            role,
            text: text.into(),
            handled_by,
        }
    }

    /// Inbound message from the customer.
    pub fn user(text: impl Into<String>, handled_by: HandledBy) -> Self {
        Self::new(MessageRole::User, text, handled_by)
    }

    /// Outbound message produced by the agent.
    pub fn assistant(text: impl Into<String>, handled_by: HandledBy) -> Self {
        Self::new(MessageRole::Assistant, text, handled_by)
    }

    /// Overrides the timestamp (inbound messages carry the platform's time).
    pub fn at(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == MessageRole::Assistant
    }
}
