//! Shared wiring for integration tests: in-memory stores, a recording
//! notifier and a scripted AI engine.

#![allow(dead_code)]

use std::sync::Arc;

use office_concierge::adapters::{
    InMemoryContextStore, InMemoryHandoffRepository, InMemoryKnowledgeBase,
    KeywordContactClassifier, KeywordResourceMatcher, MockAiEngine, RecordingNotifier,
    RuleBasedScriptBook, RuleBasedTextStyler, TokioFollowUpScheduler,
};
use office_concierge::application::{
    BotResponse, HandoffStateMachine, Orchestrator, OrchestratorDeps, OrchestratorSettings,
    UniversalMessage,
};
use office_concierge::config::HandoffConfig;
use office_concierge::domain::context::ConversationContext;
use office_concierge::domain::foundation::{ConversationId, UserId};
use office_concierge::domain::handoff::StallingCatalog;
use office_concierge::ports::{ContextStore, KnowledgeCategory, KnowledgeItem};

pub struct Desk {
    pub orchestrator: Arc<Orchestrator>,
    pub contexts: Arc<InMemoryContextStore>,
    pub ai: MockAiEngine,
    pub notifier: RecordingNotifier,
}

pub fn settings() -> OrchestratorSettings {
    let mut settings = OrchestratorSettings::default();
    settings.retry.delay_between_retries_ms = 0;
    settings
}

pub fn desk(ai: MockAiEngine) -> Desk {
    desk_with(ai, settings())
}

pub fn desk_with(ai: MockAiEngine, settings: OrchestratorSettings) -> Desk {
    desk_notifying(ai, settings, RecordingNotifier::new())
}

pub fn desk_notifying(
    ai: MockAiEngine,
    settings: OrchestratorSettings,
    notifier: RecordingNotifier,
) -> Desk {
    let contexts = Arc::new(InMemoryContextStore::new());
    let handoffs = Arc::new(HandoffStateMachine::new(
        Arc::new(InMemoryHandoffRepository::new()),
        contexts.clone(),
        Arc::new(notifier.clone()),
        StallingCatalog::default(),
        &HandoffConfig::default(),
    ));
    let (follow_ups, _due) = TokioFollowUpScheduler::new();
    let knowledge = InMemoryKnowledgeBase::new(vec![KnowledgeItem {
        id: "office-12".to_string(),
        title: "Офис 12".to_string(),
        content: "Офис на 6 человек, 45 000 ₽ в месяц, парковка включена".to_string(),
        category: KnowledgeCategory::Office,
        keywords: vec!["офис".to_string(), "стоит".to_string()],
    }]);

    let deps = OrchestratorDeps {
        contexts: contexts.clone(),
        handoffs,
        ai: Arc::new(ai.clone()),
        knowledge: Arc::new(knowledge),
        styler: Arc::new(RuleBasedTextStyler::new()),
        scripts: Arc::new(RuleBasedScriptBook::new(
            settings.orchestrator.personality.clone(),
        )),
        classifier: Arc::new(KeywordContactClassifier::new()),
        resources: Arc::new(KeywordResourceMatcher::default()),
        follow_ups: Arc::new(follow_ups),
        business_hours: None,
    };

    Desk {
        orchestrator: Arc::new(Orchestrator::new(deps, settings)),
        contexts,
        ai,
        notifier,
    }
}

pub fn conversation(id: &str) -> ConversationId {
    ConversationId::new(id).unwrap()
}

pub fn message(conversation_id: &str, text: &str) -> UniversalMessage {
    UniversalMessage::text(
        conversation(conversation_id),
        UserId::new("customer-1").unwrap(),
        "whatsapp",
        text,
    )
}

impl Desk {
    pub async fn send(&self, conversation_id: &str, text: &str) -> Option<BotResponse> {
        self.orchestrator
            .process_message(message(conversation_id, text))
            .await
    }

    pub async fn context(&self, conversation_id: &str) -> ConversationContext {
        self.contexts
            .get(&conversation(conversation_id))
            .await
            .unwrap()
            .expect("conversation exists")
    }
}
