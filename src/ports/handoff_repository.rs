//! Handoff Repository Port - storage for handoffs. Handoffs are never deleted.

use async_trait::async_trait;

use crate::domain::foundation::{ConversationId, HandoffId};
use crate::domain::handoff::{Handoff, HandoffError};

#[async_trait]
pub trait HandoffRepository: Send + Sync {
    /// Inserts or replaces by id.
    async fn save(&self, handoff: &Handoff) -> Result<(), HandoffError>;

    async fn find_by_id(&self, id: &HandoffId) -> Result<Option<Handoff>, HandoffError>;

    /// The non-terminal handoff of a conversation, if any.
    async fn find_active_by_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<Handoff>, HandoffError>;

    /// Every non-terminal handoff, unordered.
    async fn list_active(&self) -> Result<Vec<Handoff>, HandoffError>;

    async fn list_all(&self) -> Result<Vec<Handoff>, HandoffError>;
}
