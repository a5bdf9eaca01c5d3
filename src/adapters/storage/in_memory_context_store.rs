//! In-Memory Context Store Adapter
//!
//! Process-local, lost on restart. Expiry happens only through
//! `expire_old_contexts`; `get_or_create` counts as activity.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::context::{
    ContextDefaults, ContextMessage, ContextUpdate, ConversationContext, DEFAULT_HISTORY_WINDOW,
};
use crate::domain::foundation::{ConversationId, Timestamp};
use crate::ports::{ContextStore, ContextStoreError};

#[derive(Debug, Clone)]
pub struct InMemoryContextStore {
    contexts: Arc<RwLock<HashMap<ConversationId, ConversationContext>>>,
    history_window: usize,
}

impl InMemoryContextStore {
    pub fn new() -> Self {
        Self::with_history_window(DEFAULT_HISTORY_WINDOW)
    }

    pub fn with_history_window(history_window: usize) -> Self {
        Self {
            contexts: Arc::new(RwLock::new(HashMap::new())),
            history_window: history_window.max(1),
        }
    }

    /// Clear all stored data (useful for tests)
    pub async fn clear(&self) {
        self.contexts.write().await.clear();
    }
}

impl Default for InMemoryContextStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContextStore for InMemoryContextStore {
    async fn get_or_create(
        &self,
        conversation_id: &ConversationId,
        defaults: &ContextDefaults,
    ) -> Result<ConversationContext, ContextStoreError> {
        let now = Timestamp::now();
        let mut contexts = self.contexts.write().await;
        let context = contexts
            .entry(conversation_id.clone())
            .and_modify(|context| context.touch(now))
            .or_insert_with(|| ConversationContext::new(conversation_id.clone(), defaults, now));
        Ok(context.clone())
    }

    async fn get(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<ConversationContext>, ContextStoreError> {
        Ok(self.contexts.read().await.get(conversation_id).cloned())
    }

    async fn update(
        &self,
        conversation_id: &ConversationId,
        update: ContextUpdate,
    ) -> Result<Option<ConversationContext>, ContextStoreError> {
        let mut contexts = self.contexts.write().await;
        Ok(contexts.get_mut(conversation_id).map(|context| {
            update.apply_to(context, Timestamp::now());
            context.clone()
        }))
    }

    async fn add_message(
        &self,
        conversation_id: &ConversationId,
        message: ContextMessage,
    ) -> Result<(), ContextStoreError> {
        let mut contexts = self.contexts.write().await;
        let context = contexts
            .get_mut(conversation_id)
            .ok_or_else(|| ContextStoreError::NotFound(conversation_id.clone()))?;
        context.push_message(message, self.history_window);
        context.touch(Timestamp::now());
        Ok(())
    }

    async fn save(&self, context: ConversationContext) -> Result<(), ContextStoreError> {
        let mut contexts = self.contexts.write().await;
        contexts.insert(context.conversation_id.clone(), context);
        Ok(())
    }

    async fn expire_old_contexts(&self, cutoff: Timestamp) -> Result<usize, ContextStoreError> {
        let mut contexts = self.contexts.write().await;
        let before = contexts.len();
        contexts.retain(|_, context| !context.last_activity.is_before(&cutoff));
        Ok(before - contexts.len())
    }

    async fn len(&self) -> Result<usize, ContextStoreError> {
        Ok(self.contexts.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::{ConversationMode, HandledBy};
    use crate::domain::foundation::UserId;
    use proptest::prelude::*;

    fn id(s: &str) -> ConversationId {
        ConversationId::new(s).unwrap()
    }

    fn defaults() -> ContextDefaults {
        ContextDefaults::new(UserId::new("u-1").unwrap(), "telegram", 3600)
    }

    #[tokio::test]
    async fn get_or_create_is_idempotent() {
        let store = InMemoryContextStore::new();
        let a = store.get_or_create(&id("c-1"), &defaults()).await.unwrap();
        let b = store.get_or_create(&id("c-1"), &defaults()).await.unwrap();
        assert_eq!(a.session_started, b.session_started);
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn update_unknown_conversation_returns_none() {
        let store = InMemoryContextStore::new();
        let result = store
            .update(&id("missing"), ContextUpdate::mode(ConversationMode::Human))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn update_merges_fields() {
        let store = InMemoryContextStore::new();
        store.get_or_create(&id("c-1"), &defaults()).await.unwrap();
        let updated = store
            .update(&id("c-1"), ContextUpdate::mode(ConversationMode::Human))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.mode, ConversationMode::Human);
        assert_eq!(updated.platform, "telegram");
    }

    #[tokio::test]
    async fn add_message_to_unknown_conversation_fails() {
        let store = InMemoryContextStore::new();
        let err = store
            .add_message(&id("nope"), ContextMessage::user("hi", HandledBy::Ai))
            .await
            .unwrap_err();
        assert_eq!(err, ContextStoreError::NotFound(id("nope")));
    }

    #[tokio::test]
    async fn expire_removes_only_stale_contexts() {
        let store = InMemoryContextStore::new();
        let mut stale = store.get_or_create(&id("old"), &defaults()).await.unwrap();
        stale.last_activity = Timestamp::from_unix_secs(100);
        store.save(stale).await.unwrap();
        store.get_or_create(&id("fresh"), &defaults()).await.unwrap();

        let removed = store
            .expire_old_contexts(Timestamp::from_unix_secs(1_000))
            .await
            .unwrap();

        assert_eq!(removed, 1);
        assert!(store.get(&id("old")).await.unwrap().is_none());
        assert!(store.get(&id("fresh")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn get_or_create_counts_as_activity() {
        let store = InMemoryContextStore::new();
        let mut idle = store.get_or_create(&id("c-1"), &defaults()).await.unwrap();
        idle.last_activity = Timestamp::from_unix_secs(100);
        store.save(idle).await.unwrap();

        let resumed = store.get_or_create(&id("c-1"), &defaults()).await.unwrap();
        assert!(!resumed.last_activity.is_before(&Timestamp::from_unix_secs(1_000)));

        let removed = store
            .expire_old_contexts(Timestamp::from_unix_secs(1_000))
            .await
            .unwrap();
        assert_eq!(removed, 0);
        assert!(store.get(&id("c-1")).await.unwrap().is_some());
    }

    proptest! {
        #[test]
        fn history_keeps_most_recent_window_in_order(window in 1usize..30, count in 0usize..80) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let store = InMemoryContextStore::with_history_window(window);
                store.get_or_create(&id("c"), &defaults()).await.unwrap();
                for i in 0..count {
                    store
                        .add_message(&id("c"), ContextMessage::user(i.to_string(), HandledBy::Ai))
                        .await
                        .unwrap();
                }
                let ctx = store.get(&id("c")).await.unwrap().unwrap();
                let texts: Vec<String> = ctx.message_history.iter().map(|m| m.text.clone()).collect();
                let expected: Vec<String> =
                    (count.saturating_sub(window)..count).map(|i| i.to_string()).collect();
                assert_eq!(texts, expected);
            });
        }
    }
}
