//! Office Concierge server entry point.
//!
//! Loads configuration, wires the adapters into the orchestrator, starts the
//! background sweeps and serves the HTTP API.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use office_concierge::adapters::http::{desk_router, DeskAppState};
use office_concierge::adapters::{
    FixedBusinessHours, InMemoryContextStore, InMemoryHandoffRepository, InMemoryKnowledgeBase,
    KeywordContactClassifier, KeywordResourceMatcher, LogNotifier, MockAiEngine, OpenAiConfig,
    OpenAiEngine, RuleBasedScriptBook, RuleBasedTextStyler, TokioFollowUpScheduler, WebhookConfig,
    WebhookNotifier,
};
use office_concierge::application::{
    HandoffStateMachine, Orchestrator, OrchestratorDeps, OrchestratorSettings,
};
use office_concierge::config::{AiProvider, AppConfig, ConfigError, LogFormat};
use office_concierge::domain::foundation::{ConversationId, Timestamp};
use office_concierge::ports::{
    AiEngine, AiEngineError, BusinessHours, KnowledgeBase, KnowledgeError, Notifier, NotifyError,
};

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("AI engine: {0}")]
    Ai(#[from] AiEngineError),

    #[error("notifier: {0}")]
    Notifier(#[from] NotifyError),

    #[error("knowledge base: {0}")]
    Knowledge(#[from] KnowledgeError),

    #[error("server: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    config.validate().map_err(ConfigError::from)?;
    init_tracing(&config);

    let (follow_ups, follow_up_rx) = TokioFollowUpScheduler::new();
    let contexts = Arc::new(InMemoryContextStore::with_history_window(
        config.context.history_window,
    ));
    let handoffs = Arc::new(HandoffStateMachine::new(
        Arc::new(InMemoryHandoffRepository::new()),
        contexts.clone(),
        build_notifier(&config)?,
        config.handoff.stalling_catalog().map_err(ConfigError::from)?,
        &config.handoff,
    ));
    let personality = config.orchestrator.personality.clone();

    let deps = OrchestratorDeps {
        contexts,
        handoffs,
        ai: build_ai_engine(&config)?,
        knowledge: build_knowledge_base(&config).await?,
        styler: Arc::new(RuleBasedTextStyler::new()),
        scripts: Arc::new(RuleBasedScriptBook::new(personality)),
        classifier: Arc::new(KeywordContactClassifier::new()),
        resources: Arc::new(KeywordResourceMatcher::default()),
        follow_ups: Arc::new(follow_ups),
        business_hours: config
            .orchestrator
            .business_hours
            .to_business_hours()
            .map(|hours: FixedBusinessHours| Arc::new(hours) as Arc<dyn BusinessHours>),
    };
    let orchestrator = Arc::new(Orchestrator::new(deps, OrchestratorSettings::from(&config)));

    spawn_context_sweep(orchestrator.clone(), config.context.sweep_interval());
    spawn_escalation_check(
        orchestrator.clone(),
        Duration::from_secs(config.handoff.escalation_check_interval_secs),
    );
    spawn_follow_ups(orchestrator.clone(), follow_up_rx);

    let app = desk_router(DeskAppState::new(orchestrator))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors_layer(&config));

    let addr = config.server.socket_addr().map_err(ConfigError::from)?;
    tracing::info!(%addr, environment = ?config.server.environment, "Starting office concierge");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match config.server.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

fn build_ai_engine(config: &AppConfig) -> Result<Arc<dyn AiEngine>, StartupError> {
    let ai = &config.ai;
    match (ai.provider, ai.openai_api_key.as_deref()) {
        (AiProvider::OpenAI, Some(key)) => {
            let engine = OpenAiEngine::new(
                OpenAiConfig::new(key)
                    .with_model(&ai.model)
                    .with_base_url(&ai.base_url)
                    .with_timeout(ai.timeout())
                    .with_temperature(ai.temperature)
                    .with_max_tokens(ai.max_tokens),
            )?;
            tracing::info!(model = %ai.model, "Using OpenAI engine");
            Ok(Arc::new(engine))
        }
        _ => {
            tracing::warn!("No AI provider configured, replies come from the mock engine");
            Ok(Arc::new(MockAiEngine::new()))
        }
    }
}

fn build_notifier(config: &AppConfig) -> Result<Arc<dyn Notifier>, StartupError> {
    match config.handoff.webhook_url.as_deref() {
        Some(url) if config.handoff.has_webhook() => {
            let mut webhook = WebhookConfig::new(url);
            if let Some(token) = &config.handoff.webhook_token {
                webhook = webhook.with_token(token);
            }
            Ok(Arc::new(WebhookNotifier::new(webhook)?))
        }
        _ => Ok(Arc::new(LogNotifier::new())),
    }
}

async fn build_knowledge_base(config: &AppConfig) -> Result<Arc<dyn KnowledgeBase>, StartupError> {
    let knowledge = match &config.orchestrator.knowledge_path {
        Some(path) => {
            let kb = InMemoryKnowledgeBase::from_yaml_file(path).await?;
            tracing::info!(%path, "Knowledge base loaded");
            kb
        }
        None => {
            tracing::warn!("No knowledge_path configured, knowledge base is empty");
            InMemoryKnowledgeBase::new(Vec::new())
        }
    };
    Ok(Arc::new(knowledge))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins_list()
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    if origins.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

fn spawn_context_sweep(orchestrator: Arc<Orchestrator>, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            if let Err(e) = orchestrator.sweep_expired(Timestamp::now()).await {
                tracing::error!(error = %e, "Context sweep failed");
            }
        }
    });
}

fn spawn_escalation_check(orchestrator: Arc<Orchestrator>, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            match orchestrator.escalate_overdue(Timestamp::now()).await {
                Ok(0) => {}
                Ok(escalated) => tracing::warn!(escalated, "Escalated overdue handoffs"),
                Err(e) => tracing::error!(error = %e, "Escalation check failed"),
            }
        }
    });
}

/// Records due follow-ups. Delivery belongs to the platform bridge.
fn spawn_follow_ups(
    orchestrator: Arc<Orchestrator>,
    mut due: mpsc::UnboundedReceiver<ConversationId>,
) {
    tokio::spawn(async move {
        while let Some(conversation_id) = due.recv().await {
            match orchestrator.follow_up(&conversation_id).await {
                Ok(Some(text)) => {
                    tracing::info!(%conversation_id, %text, "Follow-up ready for delivery")
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(%conversation_id, error = %e, "Follow-up failed"),
            }
        }
    });
}
