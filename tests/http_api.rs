//! HTTP handlers driven directly with in-memory adapters.

mod common;

use axum::body::{to_bytes, Body};
use axum::extract::{Path, Query, State};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tower::ServiceExt;

use office_concierge::adapters::http::dto::{
    AcceptHandoffRequest, InboundMessageRequest, ResolveHandoffRequest, StatsQuery,
};
use office_concierge::adapters::http::handlers::{
    accept_handoff, get_handoff_stats, get_pending_handoffs, post_message, resolve_handoff,
};
use office_concierge::adapters::http::{desk_router, DeskAppState};
use office_concierge::adapters::MockAiEngine;

use common::desk;

// =============================================================================
// Helpers
// =============================================================================

fn inbound(conversation_id: &str, text: &str) -> InboundMessageRequest {
    serde_json::from_value(json!({
        "conversation_id": conversation_id,
        "user_id": "customer-1",
        "platform": "telegram",
        "content": {"kind": "text", "text": text}
    }))
    .unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn state(ai: MockAiEngine) -> DeskAppState {
    DeskAppState::new(desk(ai).orchestrator)
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn message_endpoint_returns_reply() {
    let state = state(MockAiEngine::new().with_response("Офис 12 свободен"));

    let response = post_message(State(state), Json(inbound("tg-1", "Есть свободный офис?")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["text"], "Офис 12 свободен.");
    assert!(body["typing_delay_ms"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn message_endpoint_returns_no_content_in_human_mode() {
    let state = state(MockAiEngine::new());
    post_message(State(state.clone()), Json(inbound("tg-2", "Ты бот?")))
        .await
        .unwrap();

    let response = post_message(State(state), Json(inbound("tg-2", "Ау?")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn blank_conversation_id_is_bad_request() {
    let state = state(MockAiEngine::new());

    let err = post_message(State(state), Json(inbound(" ", "Привет")))
        .await
        .err()
        .expect("blank id is rejected");
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn operator_flow_over_handlers() {
    let state = state(MockAiEngine::new());
    post_message(State(state.clone()), Json(inbound("tg-3", "Ты бот?")))
        .await
        .unwrap();

    let pending = body_json(
        get_pending_handoffs(State(state.clone()))
            .await
            .unwrap()
            .into_response(),
    )
    .await;
    assert_eq!(pending["total"], 1);
    assert_eq!(pending["handoffs"][0]["reason"], "AI_PROBING");
    let handoff_id = pending["handoffs"][0]["id"].as_str().unwrap().to_string();

    let accepted = accept_handoff(
        State(state.clone()),
        Path(handoff_id.clone()),
        Json(AcceptHandoffRequest {
            manager_id: "manager-anna".to_string(),
        }),
    )
    .await
    .unwrap()
    .into_response();
    assert_eq!(body_json(accepted).await["status"], "ACCEPTED");

    let resolved = resolve_handoff(
        State(state.clone()),
        Path(handoff_id.clone()),
        Json(ResolveHandoffRequest {
            summary: Some("Объяснили, что отвечает менеджер".to_string()),
            return_to_ai: true,
        }),
    )
    .await
    .unwrap()
    .into_response();
    assert_eq!(body_json(resolved).await["status"], "RESOLVED");

    let again = accept_handoff(
        State(state.clone()),
        Path(handoff_id),
        Json(AcceptHandoffRequest {
            manager_id: "manager-anna".to_string(),
        }),
    )
    .await
    .err()
    .expect("second accept is rejected");
    assert_eq!(again.into_response().status(), StatusCode::CONFLICT);

    let stats = body_json(
        get_handoff_stats(
            State(state),
            Query(StatsQuery {
                period: Some("day".to_string()),
            }),
        )
        .await
        .unwrap()
        .into_response(),
    )
    .await;
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["returned_to_ai"], 1);
}

#[tokio::test]
async fn unknown_handoff_is_not_found() {
    let state = state(MockAiEngine::new());

    let err = accept_handoff(
        State(state),
        Path("6f1c1d7e-8a43-4d1b-9a57-0d5c3f0b2f11".to_string()),
        Json(AcceptHandoffRequest {
            manager_id: "manager-anna".to_string(),
        }),
    )
    .await
    .err()
    .expect("unknown handoff is rejected");
    assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_stats_period_is_bad_request() {
    let state = state(MockAiEngine::new());

    let err = get_handoff_stats(
        State(state),
        Query(StatsQuery {
            period: Some("fortnight".to_string()),
        }),
    )
    .await
    .err()
    .expect("unknown period is rejected");
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn router_serves_health() {
    let app = desk_router(state(MockAiEngine::new()));

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["busy_conversations"], 0);
}

#[tokio::test]
async fn router_routes_messages_and_handoffs() {
    let app = desk_router(state(MockAiEngine::new()));

    let payload = json!({
        "conversation_id": "tg-routed",
        "user_id": "customer-1",
        "platform": "telegram",
        "content": {"kind": "text", "text": "Ты бот?"}
    });
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/messages")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .uri("/api/handoffs/pending")
        .body(Body::empty())
        .unwrap();
    let pending = body_json(app.clone().oneshot(request).await.unwrap()).await;
    assert_eq!(pending["total"], 1);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/handoffs/not-a-uuid/cancel")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
