//! Application layer - use cases that coordinate the domain and the ports.
//!
//! - `orchestrator` - the per-message pipeline and operator entry points
//! - `handoff` - handoff lifecycle and conversation mode
//! - `locks` - per-conversation serialization

pub mod handoff;
pub mod locks;
pub mod orchestrator;

pub use handoff::{HandoffStateMachine, InitiatedHandoff};
pub use locks::{ConversationGuard, ConversationLocks};
pub use orchestrator::{
    BotResponse, ChainedMessage, ContentKind, MessageContent, Orchestrator, OrchestratorDeps,
    OrchestratorSettings, PipelineError, UniversalMessage,
};
