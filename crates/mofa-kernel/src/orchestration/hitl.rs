//! HITL Controller (§4.F): consults a static, declarative policy at four
//! named interrupt points, creates checkpoints, and resumes execution from a
//! delivered [`Command`] or an expiry default.
//!
//! The controller is deliberately a mechanism, not a policy engine — whether
//! a step interrupts is read off `RoutingStep::require_approval` /
//! `validate_output`, never decided here. This separation mirrors
//! [`crate::workflow::policy`]'s split between `NodePolicy` (declarative) and
//! the graph executor that enforces it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;

use super::error::{HitlError, OrchestrationResult};
use super::traits::{CheckpointStore, CommandNotifier};
use super::types::{
    CheckpointStatus, Command, CommandType, DecisionPayload, ExecutionCheckpoint, InterruptPoint, RequestMode, RoutingPlan, RoutingStep,
    StepResult,
};

#[derive(Debug, Clone)]
pub struct HitlConfig {
    /// Checkpoint lifetime before the expiry sweep claims it (§4.F, default 24h).
    pub checkpoint_timeout: Duration,
    /// How long `wait_for_command` blocks for a live caller before returning
    /// control to the expiry sweep (§4.F Resume).
    pub wait_timeout: Duration,
    pub default_action: DefaultAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultAction {
    ApplyDefault,
    ImplicitDeny,
}

impl Default for HitlConfig {
    fn default() -> Self {
        Self {
            checkpoint_timeout: Duration::from_secs(24 * 60 * 60),
            wait_timeout: Duration::from_secs(300),
            default_action: DefaultAction::ImplicitDeny,
        }
    }
}

/// Outcome of consulting the controller at one interrupt point (§4.F:
/// "returns either nil (proceed) or a newly created checkpoint").
pub enum InterruptOutcome {
    Proceed,
    Suspended(ExecutionCheckpoint),
}

/// Outcome of resuming from a delivered or defaulted command.
pub enum ResumeOutcome {
    Approved,
    Rejected(String),
    Modified { parameters: Option<Value>, replacement_plan: Option<RoutingPlan> },
    Cancelled,
}

pub struct HitlController<S: CheckpointStore + ?Sized, N: CommandNotifier + ?Sized> {
    store: Arc<S>,
    notifier: Arc<N>,
    config: HitlConfig,
}

impl<S: CheckpointStore + ?Sized, N: CommandNotifier + ?Sized> HitlController<S, N> {
    pub fn new(store: Arc<S>, notifier: Arc<N>, config: HitlConfig) -> Self {
        Self { store, notifier, config }
    }

    /// Returns whether `step` requires suspension at `point` (§4.F Policy).
    /// `plan_generated` is a plan-level interrupt, evaluated by the caller
    /// before any step exists; step-level points read the step's own flags.
    pub fn should_interrupt(point: InterruptPoint, step: Option<&RoutingStep>) -> bool {
        match point {
            InterruptPoint::PlanGenerated => false,
            InterruptPoint::BeforeStep => step.is_some_and(|s| s.require_approval),
            InterruptPoint::AfterStep | InterruptPoint::OnError => step.is_some_and(|s| s.validate_output),
        }
    }

    /// The single entry point the Executor calls at each of the four named
    /// interrupt points (§4.F Interrupt points): evaluates the static policy
    /// and, only if it fires, creates a checkpoint. Never embeds runtime
    /// decision logic beyond reading `step`'s own flags.
    #[allow(clippy::too_many_arguments)]
    pub async fn consult(
        &self,
        request_id: &str,
        interrupt_point: InterruptPoint,
        step: Option<&RoutingStep>,
        plan: RoutingPlan,
        prior_results: &[StepResult],
        request_mode: RequestMode,
        user_context: HashMap<String, Value>,
    ) -> OrchestrationResult<InterruptOutcome> {
        if !Self::should_interrupt(interrupt_point, step) {
            return Ok(InterruptOutcome::Proceed);
        }
        let current_step = step.map(|s| s.step_id.clone());
        let checkpoint = self
            .checkpoint(request_id, interrupt_point, plan, current_step, prior_results, request_mode, user_context)
            .await?;
        Ok(InterruptOutcome::Suspended(checkpoint))
    }

    /// Creates, persists, and announces a checkpoint (§4.F Checkpoint creation).
    #[instrument(skip(self, plan, prior_results, user_context), fields(request_id = %request_id))]
    pub async fn checkpoint(
        &self,
        request_id: &str,
        interrupt_point: InterruptPoint,
        plan: RoutingPlan,
        current_step: Option<String>,
        prior_results: &[StepResult],
        request_mode: RequestMode,
        user_context: HashMap<String, Value>,
    ) -> OrchestrationResult<ExecutionCheckpoint> {
        let now = crate::utils::now_ms() as i64;
        let checkpoint = ExecutionCheckpoint {
            checkpoint_id: Uuid::new_v4().to_string(),
            request_id: request_id.to_string(),
            status: CheckpointStatus::Pending,
            interrupt_point,
            original_request: plan.original_request.clone(),
            plan,
            current_step,
            decision: DecisionPayload {
                reason: prior_results.last().and_then(|r| r.error.clone()),
                priority: None,
            },
            created_at: now,
            expires_at: now + self.config.checkpoint_timeout.as_millis() as i64,
            request_mode,
            user_context,
        };

        self.store.save(checkpoint.clone()).await?;
        if let Err(err) = self.notifier.notify_interrupt(&checkpoint).await {
            tracing::warn!(checkpoint_id = %checkpoint.checkpoint_id, error = %err, "HITL notification failed, checkpoint remains pending");
        }
        Ok(checkpoint)
    }

    /// Blocks until a command arrives, the wait times out, or `cancellation`
    /// fires (§4.F Resume a/b/c).
    pub async fn wait_for_command(
        &self,
        checkpoint_id: &str,
        cancellation: tokio_util::sync::CancellationToken,
    ) -> OrchestrationResult<ResumeOutcome> {
        let receiver = self.store.subscribe_command(checkpoint_id).await?;

        let command = tokio::select! {
            result = tokio::time::timeout(self.config.wait_timeout, receiver) => {
                match result {
                    Ok(Ok(command)) => command,
                    Ok(Err(_)) | Err(_) => {
                        return self.apply_expiry(checkpoint_id).await;
                    }
                }
            }
            _ = cancellation.cancelled() => {
                return Err(HitlError::Cancelled(checkpoint_id.to_string()).into());
            }
        };

        self.apply_command(checkpoint_id, command).await
    }

    /// Applies a received command, updating stored status to match (§4.F
    /// Resume approve/reject/modify/cancel).
    async fn apply_command(&self, checkpoint_id: &str, command: Command) -> OrchestrationResult<ResumeOutcome> {
        match command.command_type {
            CommandType::Approve => {
                self.store.update_status(checkpoint_id, CheckpointStatus::Approved).await?;
                Ok(ResumeOutcome::Approved)
            }
            CommandType::Reject => {
                self.store.update_status(checkpoint_id, CheckpointStatus::Rejected).await?;
                Ok(ResumeOutcome::Rejected(command.comment.unwrap_or_default()))
            }
            CommandType::Modify => {
                self.store.update_status(checkpoint_id, CheckpointStatus::Modified).await?;
                let (parameters, replacement_plan) = split_modification(command.modified_parameters);
                Ok(ResumeOutcome::Modified { parameters, replacement_plan })
            }
            CommandType::Cancel => {
                self.store.update_status(checkpoint_id, CheckpointStatus::Cancelled).await?;
                Ok(ResumeOutcome::Cancelled)
            }
        }
    }

    /// Expiry sweep single-step (§4.F Expiry semantics): claim, apply the
    /// configured default, release. A losing claimant simply reports the
    /// checkpoint as already expired by a sibling instance.
    async fn apply_expiry(&self, checkpoint_id: &str) -> OrchestrationResult<ResumeOutcome> {
        if !self.store.claim_expired(checkpoint_id).await? {
            return Err(HitlError::Expired(checkpoint_id.to_string()).into());
        }
        let checkpoint = self.store.load(checkpoint_id).await?;
        self.store.update_status(checkpoint_id, CheckpointStatus::Expired).await?;
        self.store.release_claim(checkpoint_id).await?;

        let effective_action = match checkpoint.request_mode {
            RequestMode::Streaming => DefaultAction::ImplicitDeny,
            RequestMode::NonStreaming => self.config.default_action,
        };
        match effective_action {
            DefaultAction::ApplyDefault => Ok(ResumeOutcome::Approved),
            DefaultAction::ImplicitDeny => Ok(ResumeOutcome::Rejected("checkpoint expired".to_string())),
        }
    }

    /// Runs the expiry sweep over every currently-pending checkpoint (§4.F:
    /// "a background sweep... scans the pending-index"). Intended to be
    /// called on a timer by the process hosting the controller.
    pub async fn sweep_expired(&self) -> OrchestrationResult<usize> {
        let now = crate::utils::now_ms() as i64;
        let pending = self.store.list_pending(None).await?;
        let mut swept = 0;
        for checkpoint in pending {
            if checkpoint.is_expired(now) && self.apply_expiry(&checkpoint.checkpoint_id).await.is_ok() {
                swept += 1;
            }
        }
        Ok(swept)
    }
}

/// Open Question 2 resolution: a `modify` command's `modified_parameters`
/// replaces the remaining plan only when it deserializes as a `RoutingPlan`
/// shape (has a `steps` array); otherwise it is treated as a per-step
/// parameter patch. See the resolution note for the rationale.
fn split_modification(payload: Option<Value>) -> (Option<Value>, Option<RoutingPlan>) {
    let Some(value) = payload else {
        return (None, None);
    };
    if value.get("steps").is_some_and(|s| s.is_array()) {
        match serde_json::from_value::<RoutingPlan>(value.clone()) {
            Ok(plan) => return (None, Some(plan)),
            Err(_) => return (Some(value), None),
        }
    }
    (Some(value), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestration::store::InMemoryCheckpointStore;

    struct RecordingNotifier {
        calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait::async_trait]
    impl CommandNotifier for RecordingNotifier {
        async fn notify_interrupt(&self, _checkpoint: &ExecutionCheckpoint) -> Result<(), String> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }
    }

    fn controller() -> HitlController<InMemoryCheckpointStore, RecordingNotifier> {
        HitlController::new(
            Arc::new(InMemoryCheckpointStore::new()),
            Arc::new(RecordingNotifier { calls: std::sync::atomic::AtomicUsize::new(0) }),
            HitlConfig { wait_timeout: Duration::from_millis(100), ..Default::default() },
        )
    }

    #[test]
    fn should_interrupt_reads_step_flags_not_runtime_logic() {
        let approval_step = RoutingStep::new("s1", "a", "c");
        assert!(!HitlController::<InMemoryCheckpointStore, RecordingNotifier>::should_interrupt(
            InterruptPoint::BeforeStep,
            Some(&approval_step)
        ));
        let mut flagged = approval_step.clone();
        flagged.require_approval = true;
        assert!(HitlController::<InMemoryCheckpointStore, RecordingNotifier>::should_interrupt(
            InterruptPoint::BeforeStep,
            Some(&flagged)
        ));
    }

    #[tokio::test]
    async fn consult_proceeds_when_step_has_no_approval_flag() {
        let controller = controller();
        let step = RoutingStep::new("s1", "a", "c");
        let outcome = controller
            .consult("r1", InterruptPoint::BeforeStep, Some(&step), RoutingPlan::new("p1", "req"), &[], RequestMode::NonStreaming, HashMap::new())
            .await
            .unwrap();
        assert!(matches!(outcome, InterruptOutcome::Proceed));
    }

    #[tokio::test]
    async fn consult_suspends_when_step_requires_approval() {
        let controller = controller();
        let mut step = RoutingStep::new("s1", "a", "c");
        step.require_approval = true;
        let outcome = controller
            .consult("r1", InterruptPoint::BeforeStep, Some(&step), RoutingPlan::new("p1", "req"), &[], RequestMode::NonStreaming, HashMap::new())
            .await
            .unwrap();
        match outcome {
            InterruptOutcome::Suspended(checkpoint) => assert_eq!(checkpoint.current_step.as_deref(), Some("s1")),
            InterruptOutcome::Proceed => panic!("expected suspension"),
        }
    }

    #[tokio::test]
    async fn checkpoint_persists_and_notifies() {
        let controller = controller();
        let plan = RoutingPlan::new("p1", "req");
        let checkpoint = controller
            .checkpoint("r1", InterruptPoint::PlanGenerated, plan, None, &[], RequestMode::NonStreaming, HashMap::new())
            .await
            .unwrap();
        let loaded = controller.store.load(&checkpoint.checkpoint_id).await.unwrap();
        assert_eq!(loaded.status, CheckpointStatus::Pending);
    }

    #[tokio::test]
    async fn approve_command_resumes() {
        let controller = controller();
        let plan = RoutingPlan::new("p1", "req");
        let checkpoint = controller
            .checkpoint("r1", InterruptPoint::BeforeStep, plan, Some("s1".into()), &[], RequestMode::NonStreaming, HashMap::new())
            .await
            .unwrap();

        let cp_id = checkpoint.checkpoint_id.clone();
        let store = controller.store.clone();
        tokio::spawn(async move {
            store
                .publish_command(Command {
                    checkpoint_id: cp_id,
                    command_type: CommandType::Approve,
                    user_id: "u1".to_string(),
                    timestamp: 0,
                    modified_parameters: None,
                    comment: None,
                })
                .await
                .unwrap();
        });

        let outcome = controller.wait_for_command(&checkpoint.checkpoint_id, tokio_util::sync::CancellationToken::new()).await.unwrap();
        assert!(matches!(outcome, ResumeOutcome::Approved));
    }

    #[tokio::test]
    async fn timeout_with_implicit_deny_default_rejects() {
        let controller = controller();
        let plan = RoutingPlan::new("p1", "req");
        let checkpoint = controller
            .checkpoint("r1", InterruptPoint::BeforeStep, plan, None, &[], RequestMode::NonStreaming, HashMap::new())
            .await
            .unwrap();

        let outcome = controller.wait_for_command(&checkpoint.checkpoint_id, tokio_util::sync::CancellationToken::new()).await.unwrap();
        assert!(matches!(outcome, ResumeOutcome::Rejected(_)));
        let loaded = controller.store.load(&checkpoint.checkpoint_id).await.unwrap();
        assert_eq!(loaded.status, CheckpointStatus::Expired);
    }

    #[tokio::test]
    async fn streaming_requests_always_implicit_deny_on_expiry() {
        let controller = HitlController::new(
            Arc::new(InMemoryCheckpointStore::new()),
            Arc::new(RecordingNotifier { calls: std::sync::atomic::AtomicUsize::new(0) }),
            HitlConfig { wait_timeout: Duration::from_millis(50), default_action: DefaultAction::ApplyDefault, ..Default::default() },
        );
        let plan = RoutingPlan::new("p1", "req");
        let checkpoint = controller
            .checkpoint("r1", InterruptPoint::BeforeStep, plan, None, &[], RequestMode::Streaming, HashMap::new())
            .await
            .unwrap();
        let outcome = controller.wait_for_command(&checkpoint.checkpoint_id, tokio_util::sync::CancellationToken::new()).await.unwrap();
        assert!(matches!(outcome, ResumeOutcome::Rejected(_)));
    }

    #[tokio::test]
    async fn cancellation_short_circuits_the_wait() {
        let controller = controller();
        let plan = RoutingPlan::new("p1", "req");
        let checkpoint = controller
            .checkpoint("r1", InterruptPoint::BeforeStep, plan, None, &[], RequestMode::NonStreaming, HashMap::new())
            .await
            .unwrap();
        let token = tokio_util::sync::CancellationToken::new();
        token.cancel();
        let err = controller.wait_for_command(&checkpoint.checkpoint_id, token).await.unwrap_err();
        assert!(matches!(err, super::super::error::OrchestrationError::Hitl(HitlError::Cancelled(_))));
    }

    #[test]
    fn split_modification_detects_full_plan_replacement() {
        let payload = serde_json::json!({"plan_id": "p2", "original_request": "r", "steps": []});
        let (params, plan) = split_modification(Some(payload));
        assert!(params.is_none());
        assert!(plan.is_some());
    }

    #[test]
    fn split_modification_treats_flat_object_as_patch() {
        let payload = serde_json::json!({"lat": 35.6});
        let (params, plan) = split_modification(Some(payload));
        assert!(params.is_some());
        assert!(plan.is_none());
    }
}
