//! AI Engine Port - Interface for the reply generator.
//!
//! The orchestrator hands the generator the customer's text, the conversation
//! context, the knowledge items it may rely on, and the persona to speak as.
//! The generator may also declare that a human should take over.
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//!
//! struct EchoEngine;
//!
//! #[async_trait]
//! impl AiEngine for EchoEngine {
//!     async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, AiEngineError> {
//!         Ok(GenerationResponse::text(request.text))
//!     }
//!
//!     fn name(&self) -> &str {
//!         "echo"
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::context::ConversationContext;

use super::knowledge_base::KnowledgeItem;

/// Port for reply generation.
#[async_trait]
pub trait AiEngine: Send + Sync {
    /// Generates one reply. May fail; callers retry.
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, AiEngineError>;

    /// Short engine name for logs.
    fn name(&self) -> &str;
}

/// Who the agent pretends to be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Personality {
    pub name: String,
    pub company: String,
    /// Free-form tone hint, e.g. "friendly", "formal".
    pub tone: String,
    /// Use emoji now and then.
    pub use_emoji: bool,
}

impl Default for Personality {
    fn default() -> Self {
        Self {
            name: "Анна".to_string(),
            company: "бизнес-центр".to_string(),
            tone: "friendly".to_string(),
            use_emoji: false,
        }
    }
}

/// Input to one generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// The customer's text to answer.
    pub text: String,
    pub context: ConversationContext,
    /// Items the reply may be grounded on. Always includes every office item.
    pub knowledge: Vec<KnowledgeItem>,
    pub personality: Personality,
}

impl GenerationRequest {
    pub fn new(
        text: impl Into<String>,
        context: ConversationContext,
        knowledge: Vec<KnowledgeItem>,
        personality: Personality,
    ) -> Self {
        Self {
            text: text.into(),
            context,
            knowledge,
            personality,
        }
    }
}

/// Output of one generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub text: String,
    /// Model's own confidence, 0.0–1.0.
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    /// The model asks for a human.
    #[serde(default)]
    pub requires_handoff: bool,
    #[serde(default)]
    pub handoff_reason: Option<String>,
    /// Ids of the knowledge items the reply relied on.
    #[serde(default)]
    pub used_knowledge: Vec<String>,
}

fn default_confidence() -> f64 {
    0.8
}

impl GenerationResponse {
    /// Plain reply with default confidence and no handoff request.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: default_confidence(),
            requires_handoff: false,
            handoff_reason: None,
            used_knowledge: Vec::new(),
        }
    }

    /// Reply in which the model asks to be replaced by a human.
    pub fn handoff(text: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            requires_handoff: true,
            handoff_reason: Some(reason.into()),
            ..Self::text(text)
        }
    }
}

/// Reply generation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AiEngineError {
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    #[error("engine unavailable: {0}")]
    Unavailable(String),

    #[error("request timed out")]
    Timeout,

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl AiEngineError {
    /// Errors worth another attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            AiEngineError::AuthenticationFailed | AiEngineError::InvalidRequest(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_deserializes_with_defaults() {
        let r: GenerationResponse = serde_json::from_str(r#"{"text":"Добрый день"}"#).unwrap();
        assert_eq!(r.text, "Добрый день");
        assert!(!r.requires_handoff);
        assert_eq!(r.confidence, 0.8);
    }

    #[test]
    fn handoff_response_sets_flag_and_reason() {
        let r = GenerationResponse::handoff("Передам менеджеру", "pricing exception");
        assert!(r.requires_handoff);
        assert_eq!(r.handoff_reason.as_deref(), Some("pricing exception"));
    }

    #[test]
    fn auth_failures_are_not_retryable() {
        assert!(!AiEngineError::AuthenticationFailed.is_retryable());
        assert!(AiEngineError::Timeout.is_retryable());
    }
}
