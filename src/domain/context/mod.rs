//! Conversation context: the per-conversation state container.
//!
//! Holds identity, mode (AI or human), the last measured mood, and a
//! bounded rolling history. Contains no detection logic.

mod conversation;
mod message;

pub use conversation::{
    ContextDefaults, ContextUpdate, ConversationContext, ConversationMode, EmotionalState,
    DEFAULT_HISTORY_WINDOW,
};
pub use message::{ContextMessage, HandledBy, MessageRole};
