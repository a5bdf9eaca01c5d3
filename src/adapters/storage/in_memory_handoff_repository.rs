//! In-Memory Handoff Repository Adapter

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{ConversationId, HandoffId};
use crate::domain::handoff::{Handoff, HandoffError};
use crate::ports::HandoffRepository;

#[derive(Debug, Clone, Default)]
pub struct InMemoryHandoffRepository {
    handoffs: Arc<RwLock<HashMap<HandoffId, Handoff>>>,
}

impl InMemoryHandoffRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.handoffs.read().await.len()
    }
}

#[async_trait]
impl HandoffRepository for InMemoryHandoffRepository {
    async fn save(&self, handoff: &Handoff) -> Result<(), HandoffError> {
        self.handoffs
            .write()
            .await
            .insert(handoff.id, handoff.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &HandoffId) -> Result<Option<Handoff>, HandoffError> {
        Ok(self.handoffs.read().await.get(id).cloned())
    }

    async fn find_active_by_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<Handoff>, HandoffError> {
        let handoffs = self.handoffs.read().await;
        Ok(handoffs
            .values()
            .find(|h| h.is_active() && &h.conversation_id == conversation_id)
            .cloned())
    }

    async fn list_active(&self) -> Result<Vec<Handoff>, HandoffError> {
        let handoffs = self.handoffs.read().await;
        Ok(handoffs.values().filter(|h| h.is_active()).cloned().collect())
    }

    async fn list_all(&self) -> Result<Vec<Handoff>, HandoffError> {
        Ok(self.handoffs.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::{ContextDefaults, ConversationContext};
    use crate::domain::foundation::{Timestamp, UserId};
    use crate::domain::handoff::{HandoffReason, HandoffReasonKind, Severity};

    fn handoff(conversation: &str) -> Handoff {
        let defaults = ContextDefaults::new(UserId::unknown(), "web", 60);
        let ctx = ConversationContext::new(
            ConversationId::new(conversation).unwrap(),
            &defaults,
            Timestamp::now(),
        );
        Handoff::new(
            HandoffReason::new(HandoffReasonKind::LowConfidence, "test", Severity::Low, "test"),
            ctx,
            Timestamp::now(),
        )
    }

    #[tokio::test]
    async fn finds_only_active_handoff_for_conversation() {
        let repo = InMemoryHandoffRepository::new();
        let mut done = handoff("c-1");
        done.cancel(Timestamp::now()).unwrap();
        repo.save(&done).await.unwrap();

        let conversation = ConversationId::new("c-1").unwrap();
        assert!(repo
            .find_active_by_conversation(&conversation)
            .await
            .unwrap()
            .is_none());

        let open = handoff("c-1");
        repo.save(&open).await.unwrap();
        let found = repo
            .find_active_by_conversation(&conversation)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, open.id);
        assert_eq!(repo.list_active().await.unwrap().len(), 1);
        assert_eq!(repo.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn save_replaces_by_id() {
        let repo = InMemoryHandoffRepository::new();
        let mut h = handoff("c-2");
        repo.save(&h).await.unwrap();
        h.mark_notified(Timestamp::now()).unwrap();
        repo.save(&h).await.unwrap();

        assert_eq!(repo.count().await, 1);
        let stored = repo.find_by_id(&h.id).await.unwrap().unwrap();
        assert!(stored.notified_at.is_some());
    }
}
