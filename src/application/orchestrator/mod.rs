//! Orchestrator: the per-message pipeline and the locked entry points
//! operators use to move handoffs.
//!
//! Every mutation of a conversation happens under its [`ConversationLocks`]
//! guard. The pipeline itself lives in [`pipeline`]; this module owns the
//! wiring, the fault boundary and the operator-facing wrappers.

mod pipeline;
pub mod sanitize;
mod types;

pub use types::{BotResponse, ChainedMessage, ContentKind, MessageContent, UniversalMessage};

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::application::handoff::HandoffStateMachine;
use crate::application::locks::ConversationLocks;
use crate::config::{AppConfig, ContextConfig, OrchestratorConfig, RetryConfig};
use crate::domain::context::{ContextDefaults, ContextMessage, HandledBy, MessageRole};
use crate::domain::detection::{DetectionThresholds, SituationDetector};
use crate::domain::foundation::{ConversationId, HandoffId, Timestamp};
use crate::domain::handoff::{
    Handoff, HandoffError, HandoffReason, HandoffReasonKind, HandoffStats, Resolution, Severity,
    StatsPeriod,
};
use crate::ports::{
    AiEngine, BusinessHours, ContactClassifier, ContextStore, ContextStoreError,
    FollowUpScheduler, KnowledgeBase, ResourceMatcher, ScriptBook, TextStyler,
};

/// Failures inside one pipeline run. Never leave [`Orchestrator::process_message`].
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("context store error: {0}")]
    Context(#[from] ContextStoreError),

    #[error("handoff error: {0}")]
    Handoff(#[from] HandoffError),
}

/// Collaborators the pipeline calls out to.
#[derive(Clone)]
pub struct OrchestratorDeps {
    pub contexts: Arc<dyn ContextStore>,
    pub handoffs: Arc<HandoffStateMachine>,
    pub ai: Arc<dyn AiEngine>,
    pub knowledge: Arc<dyn KnowledgeBase>,
    pub styler: Arc<dyn TextStyler>,
    pub scripts: Arc<dyn ScriptBook>,
    pub classifier: Arc<dyn ContactClassifier>,
    pub resources: Arc<dyn ResourceMatcher>,
    pub follow_ups: Arc<dyn FollowUpScheduler>,
    /// Off-hours gate is skipped when absent.
    pub business_hours: Option<Arc<dyn BusinessHours>>,
}

/// Configuration sections the pipeline reads.
#[derive(Debug, Clone, Default)]
pub struct OrchestratorSettings {
    pub detection: DetectionThresholds,
    pub orchestrator: OrchestratorConfig,
    pub retry: RetryConfig,
    pub context: ContextConfig,
}

impl From<&AppConfig> for OrchestratorSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            detection: config.detection.clone(),
            orchestrator: config.orchestrator.clone(),
            retry: config.retry.clone(),
            context: config.context.clone(),
        }
    }
}

pub struct Orchestrator {
    contexts: Arc<dyn ContextStore>,
    handoffs: Arc<HandoffStateMachine>,
    ai: Arc<dyn AiEngine>,
    knowledge: Arc<dyn KnowledgeBase>,
    styler: Arc<dyn TextStyler>,
    scripts: Arc<dyn ScriptBook>,
    classifier: Arc<dyn ContactClassifier>,
    resources: Arc<dyn ResourceMatcher>,
    follow_ups: Arc<dyn FollowUpScheduler>,
    business_hours: Option<Arc<dyn BusinessHours>>,
    detector: SituationDetector,
    locks: ConversationLocks,
    settings: OrchestratorSettings,
}

impl Orchestrator {
    pub fn new(deps: OrchestratorDeps, settings: OrchestratorSettings) -> Self {
        Self {
            contexts: deps.contexts,
            handoffs: deps.handoffs,
            ai: deps.ai,
            knowledge: deps.knowledge,
            styler: deps.styler,
            scripts: deps.scripts,
            classifier: deps.classifier,
            resources: deps.resources,
            follow_ups: deps.follow_ups,
            business_hours: deps.business_hours,
            detector: SituationDetector::new(settings.detection.clone()),
            locks: ConversationLocks::new(),
            settings,
        }
    }

    pub fn handoffs(&self) -> &Arc<HandoffStateMachine> {
        &self.handoffs
    }

    pub fn locks(&self) -> &ConversationLocks {
        &self.locks
    }

    /// Runs the pipeline for one inbound message.
    ///
    /// Messages of one conversation are processed one at a time in arrival
    /// order. `None` means nothing should be sent back.
    pub async fn process_message(&self, message: UniversalMessage) -> Option<BotResponse> {
        let _guard = self.locks.acquire(&message.conversation_id).await;

        let outcome = AssertUnwindSafe(self.run_pipeline(&message))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::error!(
                    conversation_id = %message.conversation_id,
                    error = %e,
                    "Pipeline failed"
                );
                Some(self.recover(&message).await)
            }
            Err(payload) => {
                tracing::error!(
                    conversation_id = %message.conversation_id,
                    panic = panic_message(payload.as_ref()),
                    "Pipeline panicked"
                );
                Some(self.recover(&message).await)
            }
        }
    }

    /// Best-effort technical-issue handoff after a pipeline fault.
    async fn recover(&self, message: &UniversalMessage) -> BotResponse {
        let id = &message.conversation_id;
        let config = &self.settings.orchestrator;

        let snapshot = match self.contexts.get_or_create(id, &self.defaults_for(message)).await {
            Ok(context) => context,
            Err(e) => {
                tracing::error!(conversation_id = %id, error = %e, "Context unavailable during recovery");
                return self.plain_response(config.degraded_message.clone());
            }
        };

        let reason = HandoffReason::new(
            HandoffReasonKind::TechnicalIssue,
            "Message processing failed",
            Severity::High,
            "orchestrator",
        );
        match self.handoffs.initiate_handoff(id, reason, snapshot).await {
            Ok(_) => {
                self.follow_ups.cancel(id);
                let text = config.technical_issue_message.clone();
                let record = ContextMessage::assistant(&text, HandledBy::System);
                if let Err(e) = self.contexts.add_message(id, record).await {
                    tracing::warn!(conversation_id = %id, error = %e, "Apology not recorded");
                }
                self.plain_response(text)
            }
            Err(e) => {
                tracing::error!(conversation_id = %id, error = %e, "Recovery handoff failed");
                self.plain_response(config.degraded_message.clone())
            }
        }
    }

    /// Operator takes the conversation.
    pub async fn accept_handoff(
        &self,
        handoff_id: &HandoffId,
        manager_id: &str,
    ) -> Result<Handoff, HandoffError> {
        let handoff = self.handoffs.get_handoff(handoff_id).await?;
        let _guard = self.locks.acquire(&handoff.conversation_id).await;
        self.handoffs.accept_handoff(handoff_id, manager_id).await
    }

    pub async fn resolve_handoff(
        &self,
        handoff_id: &HandoffId,
        resolution: Resolution,
    ) -> Result<Handoff, HandoffError> {
        let handoff = self.handoffs.get_handoff(handoff_id).await?;
        let _guard = self.locks.acquire(&handoff.conversation_id).await;
        let resolved = self.handoffs.resolve_handoff(handoff_id, resolution).await?;
        if resolved.returned_to_ai() {
            self.follow_ups.schedule(
                &resolved.conversation_id,
                self.settings.orchestrator.follow_up_delay(),
            );
        }
        Ok(resolved)
    }

    pub async fn cancel_handoff(&self, handoff_id: &HandoffId) -> Result<Handoff, HandoffError> {
        let handoff = self.handoffs.get_handoff(handoff_id).await?;
        let _guard = self.locks.acquire(&handoff.conversation_id).await;
        self.handoffs.cancel_handoff(handoff_id).await
    }

    /// Escalates notified handoffs nobody picked up in time.
    ///
    /// Each candidate is re-read under its conversation lock, so an operator
    /// who accepted in the meantime wins.
    pub async fn escalate_overdue(&self, now: Timestamp) -> Result<usize, HandoffError> {
        let mut escalated = 0;
        for candidate in self.handoffs.overdue_handoffs(now).await? {
            let _guard = self.locks.acquire(&candidate.conversation_id).await;
            if self.handoffs.escalate_if_overdue(&candidate.id, now).await? {
                escalated += 1;
            }
        }
        Ok(escalated)
    }

    pub async fn pending_handoffs(&self) -> Result<Vec<Handoff>, HandoffError> {
        self.handoffs.get_pending_handoffs().await
    }

    pub async fn handoff_stats(&self, period: StatsPeriod) -> Result<HandoffStats, HandoffError> {
        self.handoffs.get_handoff_stats(period).await
    }

    /// Nudge for a conversation that went quiet.
    ///
    /// Returns the text to send, or `None` when a human owns the conversation,
    /// the context expired, or the last word is already ours.
    pub async fn follow_up(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<String>, PipelineError> {
        let _guard = self.locks.acquire(conversation_id).await;

        let Some(context) = self.contexts.get(conversation_id).await? else {
            return Ok(None);
        };
        if context.is_human_mode() {
            return Ok(None);
        }
        let text = self.settings.orchestrator.follow_up_message.clone();
        let already_nudged = context
            .message_history
            .back()
            .is_some_and(|m| m.role == MessageRole::Assistant && m.text == text);
        if already_nudged {
            return Ok(None);
        }

        self.contexts
            .add_message(conversation_id, ContextMessage::assistant(&text, HandledBy::Ai))
            .await?;
        tracing::info!(%conversation_id, "Follow-up sent");
        Ok(Some(text))
    }

    /// Drops contexts idle longer than the configured TTL.
    pub async fn sweep_expired(&self, now: Timestamp) -> Result<usize, ContextStoreError> {
        let cutoff = now.minus_secs(self.settings.context.ttl_secs);
        let removed = self.contexts.expire_old_contexts(cutoff).await?;
        if removed > 0 {
            tracing::info!(removed, "Expired idle conversations");
        }
        Ok(removed)
    }

    fn defaults_for(&self, message: &UniversalMessage) -> ContextDefaults {
        let platform = if message.platform.trim().is_empty() {
            self.settings.context.default_platform.clone()
        } else {
            message.platform.clone()
        };
        ContextDefaults::new(message.user_id.clone(), platform, self.settings.context.ttl_secs)
    }

    fn plain_response(&self, text: String) -> BotResponse {
        BotResponse {
            typing_delay: self.styler.typing_delay(&text),
            text,
            attachment: None,
            additional_messages: Vec::new(),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::adapters::dialogue::{
        KeywordContactClassifier, KeywordResourceMatcher, RuleBasedScriptBook, RuleBasedTextStyler,
    };
    use crate::adapters::knowledge::InMemoryKnowledgeBase;
    use crate::adapters::notification::RecordingNotifier;
    use crate::adapters::scheduling::TokioFollowUpScheduler;
    use crate::adapters::storage::{InMemoryContextStore, InMemoryHandoffRepository};
    use crate::config::HandoffConfig;
    use crate::domain::context::{ContextUpdate, ConversationContext, ConversationMode};
    use crate::domain::foundation::UserId;
    use crate::domain::handoff::StallingCatalog;
    use crate::ports::{AiEngineError, GenerationRequest, GenerationResponse, HandoffRepository};

    struct PanickingAi;

    #[async_trait]
    impl AiEngine for PanickingAi {
        async fn generate(
            &self,
            _request: GenerationRequest,
        ) -> Result<GenerationResponse, AiEngineError> {
            panic!("model client blew up");
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    struct BrokenContextStore;

    fn storage_down() -> ContextStoreError {
        ContextStoreError::Storage("store offline".to_string())
    }

    #[async_trait]
    impl ContextStore for BrokenContextStore {
        async fn get_or_create(
            &self,
            _conversation_id: &ConversationId,
            _defaults: &ContextDefaults,
        ) -> Result<ConversationContext, ContextStoreError> {
            Err(storage_down())
        }

        async fn get(
            &self,
            _conversation_id: &ConversationId,
        ) -> Result<Option<ConversationContext>, ContextStoreError> {
            Err(storage_down())
        }

        async fn update(
            &self,
            _conversation_id: &ConversationId,
            _update: ContextUpdate,
        ) -> Result<Option<ConversationContext>, ContextStoreError> {
            Err(storage_down())
        }

        async fn add_message(
            &self,
            _conversation_id: &ConversationId,
            _message: ContextMessage,
        ) -> Result<(), ContextStoreError> {
            Err(storage_down())
        }

        async fn save(&self, _context: ConversationContext) -> Result<(), ContextStoreError> {
            Err(storage_down())
        }

        async fn expire_old_contexts(&self, _cutoff: Timestamp) -> Result<usize, ContextStoreError> {
            Err(storage_down())
        }

        async fn len(&self) -> Result<usize, ContextStoreError> {
            Err(storage_down())
        }
    }

    struct BrokenHandoffRepository;

    fn repository_down() -> HandoffError {
        HandoffError::Storage("repository offline".to_string())
    }

    #[async_trait]
    impl HandoffRepository for BrokenHandoffRepository {
        async fn save(&self, _handoff: &Handoff) -> Result<(), HandoffError> {
            Err(repository_down())
        }

        async fn find_by_id(&self, _id: &HandoffId) -> Result<Option<Handoff>, HandoffError> {
            Err(repository_down())
        }

        async fn find_active_by_conversation(
            &self,
            _conversation_id: &ConversationId,
        ) -> Result<Option<Handoff>, HandoffError> {
            Err(repository_down())
        }

        async fn list_active(&self) -> Result<Vec<Handoff>, HandoffError> {
            Err(repository_down())
        }

        async fn list_all(&self) -> Result<Vec<Handoff>, HandoffError> {
            Err(repository_down())
        }
    }

    fn orchestrator(
        ai: Arc<dyn AiEngine>,
        contexts: Arc<dyn ContextStore>,
        repository: Arc<dyn HandoffRepository>,
    ) -> Orchestrator {
        let mut settings = OrchestratorSettings::default();
        settings.retry.delay_between_retries_ms = 0;
        let handoffs = Arc::new(HandoffStateMachine::new(
            repository,
            contexts.clone(),
            Arc::new(RecordingNotifier::new()),
            StallingCatalog::default(),
            &HandoffConfig::default(),
        ));
        let (follow_ups, _rx) = TokioFollowUpScheduler::new();
        let deps = OrchestratorDeps {
            contexts,
            handoffs,
            ai,
            knowledge: Arc::new(InMemoryKnowledgeBase::new(Vec::new())),
            styler: Arc::new(RuleBasedTextStyler::new()),
            scripts: Arc::new(RuleBasedScriptBook::new(
                settings.orchestrator.personality.clone(),
            )),
            classifier: Arc::new(KeywordContactClassifier::new()),
            resources: Arc::new(KeywordResourceMatcher::default()),
            follow_ups: Arc::new(follow_ups),
            business_hours: None,
        };
        Orchestrator::new(deps, settings)
    }

    fn id() -> ConversationId {
        ConversationId::new("tg-500").unwrap()
    }

    fn question() -> UniversalMessage {
        UniversalMessage::text(
            id(),
            UserId::new("u-1").unwrap(),
            "telegram",
            "Сколько стоит офис на шесть человек?",
        )
    }

    #[tokio::test]
    async fn panic_in_the_model_becomes_a_technical_issue_handoff() {
        let contexts = Arc::new(InMemoryContextStore::new());
        let orchestrator = orchestrator(
            Arc::new(PanickingAi),
            contexts.clone(),
            Arc::new(InMemoryHandoffRepository::new()),
        );

        let response = orchestrator.process_message(question()).await.unwrap();

        let expected = OrchestratorConfig::default().technical_issue_message;
        assert_eq!(response.text, expected);
        let ctx = contexts.get(&id()).await.unwrap().unwrap();
        assert_eq!(ctx.mode, ConversationMode::Human);
        assert_eq!(ctx.message_history.back().map(|m| m.text.as_str()), Some(expected.as_str()));
        let handoff = orchestrator
            .handoffs()
            .get_active_handoff(&id())
            .await
            .unwrap()
            .expect("recovery opened a handoff");
        assert_eq!(handoff.reason.kind, HandoffReasonKind::TechnicalIssue);
        assert_eq!(handoff.reason.detected_by, "orchestrator");
        assert_eq!(orchestrator.locks().active_count(), 0);
    }

    #[tokio::test]
    async fn unreachable_context_store_yields_the_degraded_reply() {
        let orchestrator = orchestrator(
            Arc::new(PanickingAi),
            Arc::new(BrokenContextStore),
            Arc::new(InMemoryHandoffRepository::new()),
        );

        let response = orchestrator.process_message(question()).await.unwrap();

        assert_eq!(response.text, OrchestratorConfig::default().degraded_message);
        assert!(response.attachment.is_none());
    }

    #[tokio::test]
    async fn failed_recovery_handoff_yields_the_degraded_reply() {
        let contexts = Arc::new(InMemoryContextStore::new());
        let orchestrator = orchestrator(
            Arc::new(PanickingAi),
            contexts.clone(),
            Arc::new(BrokenHandoffRepository),
        );

        let response = orchestrator.process_message(question()).await.unwrap();

        assert_eq!(response.text, OrchestratorConfig::default().degraded_message);
        let ctx = contexts.get(&id()).await.unwrap().unwrap();
        assert_eq!(ctx.mode, ConversationMode::Ai);
    }

    #[tokio::test]
    async fn sweep_keeps_a_resumed_conversation() {
        let contexts = Arc::new(InMemoryContextStore::new());
        let orchestrator = orchestrator(
            Arc::new(crate::adapters::ai::MockAiEngine::new()),
            contexts.clone(),
            Arc::new(InMemoryHandoffRepository::new()),
        );
        let ttl = OrchestratorSettings::default().context.ttl_secs;
        let defaults = ContextDefaults::new(UserId::new("u-1").unwrap(), "telegram", ttl);
        let mut idle = contexts.get_or_create(&id(), &defaults).await.unwrap();
        idle.last_activity = Timestamp::now().minus_secs(ttl + 60);
        contexts.save(idle).await.unwrap();

        contexts.get_or_create(&id(), &defaults).await.unwrap();
        assert_eq!(orchestrator.sweep_expired(Timestamp::now()).await.unwrap(), 0);

        let much_later = Timestamp::now().plus_secs(ttl + 60);
        assert_eq!(orchestrator.sweep_expired(much_later).await.unwrap(), 1);
        assert!(contexts.get(&id()).await.unwrap().is_none());
    }
}
