//! HTTP DTOs for the message and handoff endpoints.
//!
//! These types define the JSON boundary. Durations travel as milliseconds,
//! timestamps as RFC 3339 strings.

use serde::{Deserialize, Serialize};

use crate::application::orchestrator::{BotResponse, MessageContent, UniversalMessage};
use crate::domain::foundation::{ConversationId, Timestamp, UserId, ValidationError};
use crate::domain::handoff::{
    Handoff, HandoffReasonKind, HandoffStatus, Priority, Resolution, Severity,
};
use crate::ports::Attachment;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Inbound message from a platform adapter.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessageRequest {
    pub conversation_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    /// Defaults to the time of receipt.
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
    pub content: MessageContent,
}

impl InboundMessageRequest {
    pub fn into_message(self) -> Result<UniversalMessage, ValidationError> {
        let user_id = match self.user_id.filter(|u| !u.trim().is_empty()) {
            Some(id) => UserId::new(id)?,
            None => UserId::unknown(),
        };
        Ok(UniversalMessage {
            conversation_id: ConversationId::new(self.conversation_id)?,
            user_id,
            platform: self.platform.unwrap_or_default(),
            timestamp: self.timestamp.unwrap_or_else(Timestamp::now),
            content: self.content,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AcceptHandoffRequest {
    pub manager_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolveHandoffRequest {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default = "default_return_to_ai")]
    pub return_to_ai: bool,
}

fn default_return_to_ai() -> bool {
    true
}

impl From<ResolveHandoffRequest> for Resolution {
    fn from(request: ResolveHandoffRequest) -> Self {
        Resolution::new(request.summary, request.return_to_ai)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsQuery {
    #[serde(default)]
    pub period: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct ChainedMessageResponse {
    pub text: String,
    pub delay_ms: u64,
}

/// What the platform adapter should send.
#[derive(Debug, Clone, Serialize)]
pub struct BotReplyResponse {
    pub text: String,
    pub typing_delay_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
    pub additional_messages: Vec<ChainedMessageResponse>,
}

impl From<BotResponse> for BotReplyResponse {
    fn from(response: BotResponse) -> Self {
        Self {
            text: response.text,
            typing_delay_ms: response.typing_delay.as_millis() as u64,
            attachment: response.attachment,
            additional_messages: response
                .additional_messages
                .into_iter()
                .map(|m| ChainedMessageResponse {
                    delay_ms: m.delay.as_millis() as u64,
                    text: m.text,
                })
                .collect(),
        }
    }
}

/// Operator-facing view of a handoff.
#[derive(Debug, Clone, Serialize)]
pub struct HandoffResponse {
    pub id: String,
    pub conversation_id: String,
    pub user_id: String,
    pub platform: String,
    pub reason: HandoffReasonKind,
    pub description: String,
    pub severity: Severity,
    pub detected_by: String,
    pub status: HandoffStatus,
    pub priority: Priority,
    pub escalated: bool,
    /// The customer's latest message when the handoff opened.
    pub last_message: Option<String>,
    pub initiated_at: Timestamp,
    pub notified_at: Option<Timestamp>,
    pub accepted_at: Option<Timestamp>,
    pub accepted_by: Option<String>,
    pub resolved_at: Option<Timestamp>,
    pub cancelled_at: Option<Timestamp>,
}

impl From<Handoff> for HandoffResponse {
    fn from(handoff: Handoff) -> Self {
        let last_message = handoff
            .context_snapshot
            .last_user_message()
            .map(|m| m.text.clone());
        Self {
            id: handoff.id.to_string(),
            conversation_id: handoff.conversation_id.to_string(),
            user_id: handoff.user_id.to_string(),
            platform: handoff.context_snapshot.platform,
            reason: handoff.reason.kind,
            description: handoff.reason.description,
            severity: handoff.reason.severity,
            detected_by: handoff.reason.detected_by,
            status: handoff.status,
            priority: handoff.priority,
            escalated: handoff.escalated,
            last_message,
            initiated_at: handoff.initiated_at,
            notified_at: handoff.notified_at,
            accepted_at: handoff.accepted_at,
            accepted_by: handoff.accepted_by,
            resolved_at: handoff.resolved_at,
            cancelled_at: handoff.cancelled_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingHandoffsResponse {
    pub handoffs: Vec<HandoffResponse>,
    pub total: usize,
}

impl From<Vec<Handoff>> for PendingHandoffsResponse {
    fn from(handoffs: Vec<Handoff>) -> Self {
        let handoffs: Vec<HandoffResponse> = handoffs.into_iter().map(Into::into).collect();
        Self {
            total: handoffs.len(),
            handoffs,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Conversations currently being processed.
    pub busy_conversations: usize,
}

/// Standard error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}
