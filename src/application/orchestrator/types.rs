//! Inbound and outbound message shapes shared by every platform adapter.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::foundation::{ConversationId, Timestamp, UserId};
use crate::ports::Attachment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    #[default]
    Text,
    Image,
    Voice,
    Video,
    Document,
    Sticker,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContent {
    #[serde(default)]
    pub kind: ContentKind,
    /// Body text, or the caption of a media message.
    #[serde(default)]
    pub text: Option<String>,
}

impl MessageContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: ContentKind::Text,
            text: Some(text.into()),
        }
    }

    /// Trimmed text, empty when there is none.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().map(str::trim).unwrap_or_default()
    }
}

/// Platform-neutral inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniversalMessage {
    pub conversation_id: ConversationId,
    #[serde(default = "UserId::unknown")]
    pub user_id: UserId,
    #[serde(default)]
    pub platform: String,
    #[serde(default = "Timestamp::now")]
    pub timestamp: Timestamp,
    pub content: MessageContent,
}

impl UniversalMessage {
    /// A text message stamped now.
    pub fn text(
        conversation_id: ConversationId,
        user_id: UserId,
        platform: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            conversation_id,
            user_id,
            platform: platform.into(),
            timestamp: Timestamp::now(),
            content: MessageContent::text(text),
        }
    }
}

/// A message sent after the primary one.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainedMessage {
    pub text: String,
    /// Pause before sending, measured from the previous message.
    pub delay: Duration,
}

/// What the platform adapter should send back.
#[derive(Debug, Clone, PartialEq)]
pub struct BotResponse {
    pub text: String,
    /// How long to show "typing…" before the primary message.
    pub typing_delay: Duration,
    pub attachment: Option<Attachment>,
    pub additional_messages: Vec<ChainedMessage>,
}

impl BotResponse {
    /// Primary text followed by every chained text, in send order.
    pub fn all_texts(&self) -> Vec<&str> {
        std::iter::once(self.text.as_str())
            .chain(self.additional_messages.iter().map(|m| m.text.as_str()))
            .collect()
    }
}
