//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application to external systems:
//! - `ai` - Reply generation (OpenAI-compatible HTTP, scripted mock)
//! - `dialogue` - Rule-based styler, scripts, classifier, resources, hours
//! - `knowledge` - In-memory knowledge base loaded from YAML
//! - `notification` - Operator alerts (log, webhook)
//! - `scheduling` - Follow-up timers
//! - `storage` - In-memory context and handoff stores
//! - `http` - REST surface

pub mod ai;
pub mod dialogue;
pub mod http;
pub mod knowledge;
pub mod notification;
pub mod scheduling;
pub mod storage;

pub use ai::{MockAiEngine, OpenAiConfig, OpenAiEngine};
pub use dialogue::{
    FixedBusinessHours, KeywordContactClassifier, KeywordResourceMatcher, RuleBasedScriptBook,
    RuleBasedTextStyler,
};
pub use knowledge::InMemoryKnowledgeBase;
pub use notification::{LogNotifier, RecordingNotifier, WebhookConfig, WebhookNotifier};
pub use scheduling::TokioFollowUpScheduler;
pub use storage::{InMemoryContextStore, InMemoryHandoffRepository};
