//! Checkpoint & Command Store (§4.G): an in-memory reference implementation of
//! [`CheckpointStore`], shaped like [`crate::workflow::state`]'s checkpoint
//! bookkeeping but extended with the pending-index, request-index, and
//! expiry-claim semantics the HITL controller needs.
//!
//! A durable implementation (Redis, Postgres) would satisfy the same trait;
//! this one is what the runtime uses when no external store is configured.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::oneshot;
use tracing::instrument;

use super::error::{OrchestrationResult, StoreError};
use super::traits::CheckpointStore;
use super::types::{CheckpointStatus, Command, ExecutionCheckpoint};

#[derive(Default)]
struct StoreInner {
    checkpoints: HashMap<String, ExecutionCheckpoint>,
    /// checkpoint_id -> claimed (true while a controller owns the expiry sweep).
    claims: HashMap<String, bool>,
    /// checkpoint_id -> senders awaiting the next published command.
    waiters: HashMap<String, Vec<oneshot::Sender<Command>>>,
}

/// In-process `CheckpointStore`. Keyed the way the teacher's
/// [`crate::workflow::state`] checkpoints are keyed — by an opaque id — plus
/// a secondary `request_id` index for [`CheckpointStore::list_pending`].
pub struct InMemoryCheckpointStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl Default for InMemoryCheckpointStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreInner::default())),
        }
    }
}

#[async_trait::async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    #[instrument(skip(self, checkpoint), fields(checkpoint_id = %checkpoint.checkpoint_id))]
    async fn save(&self, checkpoint: ExecutionCheckpoint) -> OrchestrationResult<()> {
        self.inner.write().checkpoints.insert(checkpoint.checkpoint_id.clone(), checkpoint);
        Ok(())
    }

    async fn load(&self, checkpoint_id: &str) -> OrchestrationResult<ExecutionCheckpoint> {
        self.inner
            .read()
            .checkpoints
            .get(checkpoint_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(checkpoint_id.to_string()).into())
    }

    async fn update_status(&self, checkpoint_id: &str, status: CheckpointStatus) -> OrchestrationResult<ExecutionCheckpoint> {
        let mut guard = self.inner.write();
        let checkpoint = guard
            .checkpoints
            .get_mut(checkpoint_id)
            .ok_or_else(|| StoreError::NotFound(checkpoint_id.to_string()))?;
        checkpoint.status = status;
        Ok(checkpoint.clone())
    }

    async fn list_pending(&self, request_id: Option<&str>) -> OrchestrationResult<Vec<ExecutionCheckpoint>> {
        let guard = self.inner.read();
        Ok(guard
            .checkpoints
            .values()
            .filter(|c| c.status == CheckpointStatus::Pending)
            .filter(|c| request_id.is_none_or(|rid| c.request_id == rid))
            .cloned()
            .collect())
    }

    async fn delete(&self, checkpoint_id: &str) -> OrchestrationResult<()> {
        let mut guard = self.inner.write();
        guard.checkpoints.remove(checkpoint_id);
        guard.claims.remove(checkpoint_id);
        guard.waiters.remove(checkpoint_id);
        Ok(())
    }

    /// SETNX-style: succeeds (returns `true`) only the first time a given
    /// checkpoint is claimed; subsequent callers observe `false` (§4.G
    /// Expiry sweep — at-most-once claim).
    async fn claim_expired(&self, checkpoint_id: &str) -> OrchestrationResult<bool> {
        let mut guard = self.inner.write();
        if guard.claims.get(checkpoint_id).copied().unwrap_or(false) {
            return Ok(false);
        }
        guard.claims.insert(checkpoint_id.to_string(), true);
        Ok(true)
    }

    async fn release_claim(&self, checkpoint_id: &str) -> OrchestrationResult<()> {
        self.inner.write().claims.remove(checkpoint_id);
        Ok(())
    }

    async fn publish_command(&self, command: Command) -> OrchestrationResult<()> {
        let waiters = self.inner.write().waiters.remove(&command.checkpoint_id);
        if let Some(senders) = waiters {
            for sender in senders {
                // A dropped receiver (the controller timed out first) is not
                // an error; the command still gets recorded via `save`/
                // `update_status` by the caller.
                let _ = sender.send(command.clone());
            }
        }
        Ok(())
    }

    async fn subscribe_command(&self, checkpoint_id: &str) -> OrchestrationResult<oneshot::Receiver<Command>> {
        let (tx, rx) = oneshot::channel();
        self.inner
            .write()
            .waiters
            .entry(checkpoint_id.to_string())
            .or_default()
            .push(tx);
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestration::types::{DecisionPayload, InterruptPoint, RequestMode, RoutingPlan};

    fn fixture_checkpoint(id: &str, request_id: &str) -> ExecutionCheckpoint {
        ExecutionCheckpoint {
            checkpoint_id: id.to_string(),
            request_id: request_id.to_string(),
            status: CheckpointStatus::Pending,
            interrupt_point: InterruptPoint::PlanGenerated,
            plan: RoutingPlan::new("p1", "req"),
            current_step: None,
            decision: DecisionPayload::default(),
            created_at: 0,
            expires_at: 60_000,
            request_mode: RequestMode::NonStreaming,
            user_context: HashMap::new(),
            original_request: "req".to_string(),
        }
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let store = InMemoryCheckpointStore::new();
        store.save(fixture_checkpoint("c1", "r1")).await.unwrap();
        let loaded = store.load("c1").await.unwrap();
        assert_eq!(loaded.checkpoint_id, "c1");
    }

    #[tokio::test]
    async fn load_missing_checkpoint_errors() {
        let store = InMemoryCheckpointStore::new();
        assert!(store.load("ghost").await.is_err());
    }

    #[tokio::test]
    async fn list_pending_filters_by_request_id_and_status() {
        let store = InMemoryCheckpointStore::new();
        store.save(fixture_checkpoint("c1", "r1")).await.unwrap();
        store.save(fixture_checkpoint("c2", "r2")).await.unwrap();
        store.update_status("c2", CheckpointStatus::Approved).await.unwrap();

        let all_pending = store.list_pending(None).await.unwrap();
        assert_eq!(all_pending.len(), 1);
        assert_eq!(all_pending[0].checkpoint_id, "c1");

        let scoped = store.list_pending(Some("r1")).await.unwrap();
        assert_eq!(scoped.len(), 1);
        let scoped_other = store.list_pending(Some("r2")).await.unwrap();
        assert!(scoped_other.is_empty());
    }

    #[tokio::test]
    async fn claim_expired_is_at_most_once() {
        let store = InMemoryCheckpointStore::new();
        assert!(store.claim_expired("c1").await.unwrap());
        assert!(!store.claim_expired("c1").await.unwrap());
        store.release_claim("c1").await.unwrap();
        assert!(store.claim_expired("c1").await.unwrap());
    }

    #[tokio::test]
    async fn subscribe_then_publish_delivers_command() {
        let store = InMemoryCheckpointStore::new();
        let rx = store.subscribe_command("c1").await.unwrap();
        let command = Command {
            checkpoint_id: "c1".to_string(),
            command_type: super::super::types::CommandType::Approve,
            user_id: "u1".to_string(),
            timestamp: 0,
            modified_parameters: None,
            comment: None,
        };
        store.publish_command(command).await.unwrap();
        let received = rx.await.unwrap();
        assert_eq!(received.checkpoint_id, "c1");
    }

    #[tokio::test]
    async fn publish_with_no_subscriber_does_not_error() {
        let store = InMemoryCheckpointStore::new();
        let command = Command {
            checkpoint_id: "c1".to_string(),
            command_type: super::super::types::CommandType::Cancel,
            user_id: "u1".to_string(),
            timestamp: 0,
            modified_parameters: None,
            comment: None,
        };
        store.publish_command(command).await.unwrap();
    }
}
