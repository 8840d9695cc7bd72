//! Inbound HITL webhook: delivers a `Command` (approve/reject/modify/cancel)
//! referencing a checkpoint id to the orchestration runtime's command store
//! (§6.4).
//!
//! Grounded on `server.rs`'s `AppState` + `State` extractor + `IntoResponse`
//! pattern, reduced to the one route this crate's HITL surface needs.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use mofa_kernel::orchestration::traits::CheckpointStore;
use mofa_kernel::orchestration::types::Command;
use serde_json::json;

/// State injected into the HITL router via [`State`].
#[derive(Clone)]
pub struct HitlState {
    store: Arc<dyn CheckpointStore>,
}

impl HitlState {
    pub fn new(store: Arc<dyn CheckpointStore>) -> Self {
        Self { store }
    }
}

/// Mounts `POST /hitl/commands` on the given router, matching the
/// documented inbound webhook body (§6.4): `{checkpoint_id, type, user_id,
/// modified_parameters?, comment?, timestamp?}`.
pub fn hitl_router(state: HitlState) -> Router {
    Router::new().route("/hitl/commands", post(submit_command)).with_state(state)
}

async fn submit_command(State(state): State<HitlState>, Json(command): Json<Command>) -> Response {
    // `publish_command` itself never fails for an unknown checkpoint (there's
    // simply no waiter to wake) so existence is checked explicitly first.
    if let Err(err) = state.store.load(&command.checkpoint_id).await {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"code": "CHECKPOINT_UNAVAILABLE", "message": err.to_string()}})),
        )
            .into_response();
    }

    match state.store.publish_command(command).await {
        Ok(()) => (StatusCode::ACCEPTED, Json(json!({"status": "accepted"}))).into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": {"code": "COMMAND_DELIVERY_FAILED", "message": err.to_string()}})),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use mofa_kernel::orchestration::store::InMemoryCheckpointStore;
    use mofa_kernel::orchestration::types::{CheckpointStatus, DecisionPayload, ExecutionCheckpoint, InterruptPoint, RequestMode, RoutingPlan};
    use tower::ServiceExt;

    fn checkpoint() -> ExecutionCheckpoint {
        ExecutionCheckpoint {
            checkpoint_id: "cp-1".into(),
            request_id: "req-1".into(),
            status: CheckpointStatus::Pending,
            interrupt_point: InterruptPoint::BeforeStep,
            plan: RoutingPlan::new("p1", "do a thing"),
            current_step: Some("s1".into()),
            decision: DecisionPayload::default(),
            created_at: 0,
            expires_at: 1_000_000_000_000,
            request_mode: RequestMode::NonStreaming,
            user_context: Default::default(),
            original_request: "do a thing".into(),
        }
    }

    #[tokio::test]
    async fn accepts_a_command_for_a_known_checkpoint() {
        let store: Arc<dyn CheckpointStore> = Arc::new(InMemoryCheckpointStore::new());
        store.save(checkpoint()).await.unwrap();
        let router = hitl_router(HitlState::new(store));

        let body = serde_json::json!({
            "checkpoint_id": "cp-1",
            "type": "approve",
            "user_id": "alice",
        });
        let request = Request::builder()
            .method("POST")
            .uri("/hitl/commands")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn rejects_a_command_for_an_unknown_checkpoint() {
        let store: Arc<dyn CheckpointStore> = Arc::new(InMemoryCheckpointStore::new());
        let router = hitl_router(HitlState::new(store));

        let body = serde_json::json!({
            "checkpoint_id": "ghost",
            "type": "approve",
            "user_id": "alice",
        });
        let request = Request::builder()
            .method("POST")
            .uri("/hitl/commands")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
