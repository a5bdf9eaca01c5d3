//! Context Store Port - per-conversation state container.
//!
//! Holds no detection logic. All writes for one conversation happen inside
//! the orchestrator's per-conversation lock.

use async_trait::async_trait;

use crate::domain::context::{ContextDefaults, ContextMessage, ContextUpdate, ConversationContext};
use crate::domain::foundation::{ConversationId, DomainError, ErrorCode, Timestamp};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContextStoreError {
    #[error("Conversation not found: {0}")]
    NotFound(ConversationId),

    #[error("Context storage error: {0}")]
    Storage(String),
}

impl From<ContextStoreError> for DomainError {
    fn from(err: ContextStoreError) -> Self {
        let code = match &err {
            ContextStoreError::NotFound(_) => ErrorCode::ConversationNotFound,
            ContextStoreError::Storage(_) => ErrorCode::StorageError,
        };
        DomainError::new(code, err.to_string())
    }
}

#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Returns the context, creating it from `defaults` on first access.
    /// Counts as activity: an existing context's `last_activity` is refreshed.
    async fn get_or_create(
        &self,
        conversation_id: &ConversationId,
        defaults: &ContextDefaults,
    ) -> Result<ConversationContext, ContextStoreError>;

    async fn get(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<ConversationContext>, ContextStoreError>;

    /// Merges `update` and refreshes `last_activity`. `None` if unknown.
    async fn update(
        &self,
        conversation_id: &ConversationId,
        update: ContextUpdate,
    ) -> Result<Option<ConversationContext>, ContextStoreError>;

    /// Appends to history, keeping only the configured window.
    async fn add_message(
        &self,
        conversation_id: &ConversationId,
        message: ContextMessage,
    ) -> Result<(), ContextStoreError>;

    /// Replaces the whole context.
    async fn save(&self, context: ConversationContext) -> Result<(), ContextStoreError>;

    /// Drops contexts with `last_activity < cutoff`. Returns how many.
    async fn expire_old_contexts(&self, cutoff: Timestamp) -> Result<usize, ContextStoreError>;

    async fn len(&self) -> Result<usize, ContextStoreError>;
}
