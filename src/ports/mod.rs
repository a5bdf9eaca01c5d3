//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Collaborator Ports
//!
//! - `AiEngine` - Reply generation
//! - `KnowledgeBase` - Ranked facts and office listings
//! - `Notifier` - Operator alerts
//! - `TextStyler` - Human-sounding rewrites and typing delays
//! - `ContactClassifier`, `ScriptBook`, `ResourceMatcher` - Pre-generation checks
//! - `FollowUpScheduler`, `BusinessHours` - Timing
//!
//! ## Storage Ports
//!
//! - `ContextStore` - Per-conversation state
//! - `HandoffRepository` - Handoff records

mod ai_engine;
mod business_hours;
mod contact_classifier;
mod context_store;
mod follow_up;
mod handoff_repository;
mod knowledge_base;
mod notifier;
mod resource_matcher;
mod script_book;
mod text_styler;

pub use ai_engine::{AiEngine, AiEngineError, GenerationRequest, GenerationResponse, Personality};
pub use business_hours::BusinessHours;
pub use contact_classifier::{ContactCategory, ContactClassification, ContactClassifier};
pub use context_store::{ContextStore, ContextStoreError};
pub use follow_up::FollowUpScheduler;
pub use handoff_repository::HandoffRepository;
pub use knowledge_base::{KnowledgeBase, KnowledgeCategory, KnowledgeError, KnowledgeItem};
pub use notifier::{Notifier, NotifyError};
pub use resource_matcher::{Attachment, AttachmentKind, ResourceMatcher};
pub use script_book::{Greeting, ScriptBook, ScriptedReply};
pub use text_styler::TextStyler;
