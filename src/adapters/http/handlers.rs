//! HTTP handlers for inbound messages and the operator handoff queue.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::Orchestrator;
use crate::domain::foundation::{DomainError, ErrorCode, HandoffId};
use crate::domain::handoff::{HandoffError, StatsPeriod};

use super::dto::{
    AcceptHandoffRequest, BotReplyResponse, ErrorResponse, HandoffResponse, HealthResponse,
    InboundMessageRequest, PendingHandoffsResponse, ResolveHandoffRequest, StatsQuery,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the desk endpoints.
#[derive(Clone)]
pub struct DeskAppState {
    pub orchestrator: Arc<Orchestrator>,
}

impl DeskAppState {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Message Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/messages - Run one inbound message through the pipeline
///
/// Responds 204 when nothing should be sent back.
pub async fn post_message(
    State(state): State<DeskAppState>,
    Json(request): Json<InboundMessageRequest>,
) -> Result<Response, ApiError> {
    let message = request.into_message().map_err(DomainError::from)?;

    match state.orchestrator.process_message(message).await {
        Some(reply) => Ok(Json(BotReplyResponse::from(reply)).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handoff Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/handoffs/pending - Waiting handoffs, most urgent first
pub async fn get_pending_handoffs(
    State(state): State<DeskAppState>,
) -> Result<impl IntoResponse, ApiError> {
    let pending = state.orchestrator.pending_handoffs().await?;
    Ok(Json(PendingHandoffsResponse::from(pending)))
}

/// GET /api/handoffs/stats?period=day|week|month|all
pub async fn get_handoff_stats(
    State(state): State<DeskAppState>,
    Query(query): Query<StatsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let period = match query.period.as_deref() {
        Some(raw) => StatsPeriod::parse(raw).map_err(DomainError::from)?,
        None => StatsPeriod::default(),
    };
    let stats = state.orchestrator.handoff_stats(period).await?;
    Ok(Json(stats))
}

/// POST /api/handoffs/:handoff_id/accept
pub async fn accept_handoff(
    State(state): State<DeskAppState>,
    Path(handoff_id): Path<String>,
    Json(request): Json<AcceptHandoffRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handoff_id = parse_handoff_id(&handoff_id)?;
    if request.manager_id.trim().is_empty() {
        return Err(DomainError::validation("manager_id", "manager_id is required").into());
    }

    let handoff = state
        .orchestrator
        .accept_handoff(&handoff_id, request.manager_id.trim())
        .await?;
    Ok(Json(HandoffResponse::from(handoff)))
}

/// POST /api/handoffs/:handoff_id/resolve
pub async fn resolve_handoff(
    State(state): State<DeskAppState>,
    Path(handoff_id): Path<String>,
    Json(request): Json<ResolveHandoffRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handoff_id = parse_handoff_id(&handoff_id)?;
    let handoff = state
        .orchestrator
        .resolve_handoff(&handoff_id, request.into())
        .await?;
    Ok(Json(HandoffResponse::from(handoff)))
}

/// POST /api/handoffs/:handoff_id/cancel
pub async fn cancel_handoff(
    State(state): State<DeskAppState>,
    Path(handoff_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let handoff_id = parse_handoff_id(&handoff_id)?;
    let handoff = state.orchestrator.cancel_handoff(&handoff_id).await?;
    Ok(Json(HandoffResponse::from(handoff)))
}

/// GET /health
pub async fn health(State(state): State<DeskAppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        busy_conversations: state.orchestrator.locks().active_count(),
    })
}

fn parse_handoff_id(raw: &str) -> Result<HandoffId, ApiError> {
    raw.parse::<HandoffId>().map_err(|_| {
        DomainError::new(ErrorCode::InvalidFormat, "handoff_id must be a UUID")
            .with_detail("handoff_id", raw)
            .into()
    })
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error wrapper that converts domain errors into HTTP responses.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl From<HandoffError> for ApiError {
    fn from(err: HandoffError) -> Self {
        Self(err.into())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.code {
            ErrorCode::ConversationNotFound | ErrorCode::HandoffNotFound => StatusCode::NOT_FOUND,
            ErrorCode::InvalidStateTransition | ErrorCode::HandoffAlreadyActive => {
                StatusCode::CONFLICT
            }
            ErrorCode::ValidationFailed | ErrorCode::EmptyField | ErrorCode::InvalidFormat => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::AIProviderError | ErrorCode::NotificationFailed => StatusCode::BAD_GATEWAY,
            ErrorCode::StorageError | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }

        let mut body = ErrorResponse::new(self.0.code.to_string(), self.0.message.clone());
        if !self.0.details.is_empty() {
            body = body.with_details(serde_json::json!(self.0.details));
        }
        (status, Json(body)).into_response()
    }
}
