//! Script Book Port - deterministic canned replies.
//!
//! Scripts run before the detector and the generator: operator requests,
//! greetings, the de-escalation sequence, off-topic deflection.

use crate::domain::context::ConversationContext;
use crate::domain::handoff::HandoffReason;

/// A canned multi-message reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedReply {
    /// Script name for logs.
    pub name: String,
    /// Sent in order; the first is the primary response.
    pub messages: Vec<String>,
    /// Escalate after replying.
    pub handoff: Option<HandoffReason>,
}

/// A detected greeting and whatever else the customer wrote with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Greeting {
    pub reply: String,
    /// Substantive request left after stripping the greeting, if any.
    pub remainder: Option<String>,
}

pub trait ScriptBook: Send + Sync {
    fn match_script(&self, text: &str, context: &ConversationContext) -> Option<ScriptedReply>;

    /// Only greets once per conversation.
    fn detect_greeting(&self, text: &str, context: &ConversationContext) -> Option<Greeting>;

    /// Calm-down sequence sent when the customer swears.
    fn de_escalation(&self) -> Vec<String>;

    fn is_off_topic(&self, text: &str) -> bool;

    fn off_topic_reply(&self) -> String;
}
