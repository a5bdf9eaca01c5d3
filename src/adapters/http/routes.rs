//! Axum router for the desk endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    accept_handoff, cancel_handoff, get_handoff_stats, get_pending_handoffs, health,
    post_message, resolve_handoff, DeskAppState,
};

/// Operator endpoints, mounted at `/api/handoffs`.
///
/// # Routes
/// - `GET /pending` - Waiting handoffs, most urgent first
/// - `GET /stats` - Aggregates for `?period=`
/// - `POST /:handoff_id/accept` - Operator takes the conversation
/// - `POST /:handoff_id/resolve` - Close, optionally returning to the bot
/// - `POST /:handoff_id/cancel` - Withdraw, returning to the bot
pub fn handoff_routes() -> Router<DeskAppState> {
    Router::new()
        .route("/pending", get(get_pending_handoffs))
        .route("/stats", get(get_handoff_stats))
        .route("/:handoff_id/accept", post(accept_handoff))
        .route("/:handoff_id/resolve", post(resolve_handoff))
        .route("/:handoff_id/cancel", post(cancel_handoff))
}

/// The complete desk router with state applied.
///
/// ```ignore
/// let app = desk_router(DeskAppState::new(orchestrator))
///     .layer(TraceLayer::new_for_http());
/// ```
pub fn desk_router(state: DeskAppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/messages", post(post_message))
        .nest("/api/handoffs", handoff_routes())
        .with_state(state)
}
