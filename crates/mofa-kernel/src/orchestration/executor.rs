//! DAG Executor (§4.D): dependency-ordered, bounded-concurrency execution of
//! `RoutingPlan` steps.
//!
//! Grounded on [`crate::workflow::planning::Plan::topological_order`] (Kahn's
//! algorithm) for the acyclicity guarantee, and on `mofa-foundation`'s
//! `PlanningExecutor::execute_plan` for the ready-set/batch shape — but this
//! implementation upgrades the teacher's sequential batch dispatch into a real
//! bounded-concurrency batch: every ready step is spawned immediately, gated
//! by a `Semaphore` permit, and the whole batch is drained through a
//! `JoinSet` before the next ready set is computed (§4.D).
//!
//! Each step's parameters pass through [`super::reconcile`]'s Layer 1/2
//! auto-wiring and coercion before dispatch, and an optional
//! [`super::traits::CorrectionCallback`] gets one shot at Layer 3 correction
//! when a response looks like a parameter type mismatch (§4.E).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{instrument, warn};

use super::error::{ExecutorError, HitlError, OrchestrationError, OrchestrationResult};
use super::hitl::{HitlController, InterruptOutcome, ResumeOutcome};
use super::reconcile;
use super::traits::{AgentClient, CheckpointStore, CommandNotifier, CorrectionCallback};
use super::types::{
    Capability, ExecutionResult, InterruptPoint, RegisteredAgent, RequestMode, RoutingPlan, RoutingStep, StepResult,
    SKIPPED_DEPENDENCY_MARKER,
};

/// The concrete HITL handle an executor is wired against: the controller is
/// generic over its store/notifier, but the executor only ever needs to call
/// it, never to pick it apart, so a trait object pair is enough here.
type DynHitlController = HitlController<dyn CheckpointStore, dyn CommandNotifier>;

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Bound on simultaneously-executing steps within one plan (§4.D, default 5).
    pub max_concurrency: usize,
    /// Per-step retry cap (§4.D, default 3).
    pub max_attempts: u32,
    /// Per-attempt HTTP timeout (§5, default 30s).
    pub step_timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 5,
            max_attempts: 3,
            step_timeout: Duration::from_secs(30),
        }
    }
}

/// Resolves a `RoutingStep`'s target agent + capability; abstracts the catalog
/// lookup so the executor does not depend on a concrete `AgentCatalog<D, F>`
/// instantiation.
#[async_trait::async_trait]
pub trait StepTarget: Send + Sync {
    async fn resolve(&self, agent_name: &str, capability_name: &str) -> Option<(RegisteredAgent, Capability)>;
}

pub struct DagExecutor<T: StepTarget, C: AgentClient> {
    target: Arc<T>,
    client: Arc<C>,
    config: ExecutorConfig,
    correction: Option<Arc<dyn CorrectionCallback>>,
    hitl: Option<Arc<DynHitlController>>,
}

fn now_ms() -> i64 {
    crate::utils::now_ms() as i64
}

#[async_trait::async_trait]
impl<D: super::traits::AgentDiscovery, F: super::traits::CapabilityFetcher> StepTarget for super::catalog::AgentCatalog<D, F> {
    async fn resolve(&self, agent_name: &str, capability_name: &str) -> Option<(RegisteredAgent, Capability)> {
        let agent = self.get_agent_by_name(agent_name).await?;
        let capability = agent.find_capability(capability_name)?.clone();
        Some((agent, capability))
    }
}

impl<T: StepTarget + 'static, C: AgentClient + 'static> DagExecutor<T, C> {
    pub fn new(target: Arc<T>, client: Arc<C>, config: ExecutorConfig) -> Self {
        Self { target, client, config, correction: None, hitl: None }
    }

    /// Installs a Layer 3 correction callback (§4.E): consulted once per step
    /// when a failed response matches [`reconcile::looks_like_type_error`].
    pub fn with_correction_callback(mut self, callback: Arc<dyn CorrectionCallback>) -> Self {
        self.correction = Some(callback);
        self
    }

    /// Wires a HITL controller (§4.F): consulted at `plan_generated` before
    /// the first step and at `before_step`/`after_step`/`on_error` around
    /// every step. Without this, the executor never suspends.
    pub fn with_hitl_controller(mut self, hitl: Arc<DynHitlController>) -> Self {
        self.hitl = Some(hitl);
        self
    }

    /// Runs `plan` to completion, honoring `cancellation` (§5 Cancellation).
    #[instrument(skip(self, plan, cancellation), fields(plan_id = %plan.plan_id))]
    pub async fn execute(&self, plan: &RoutingPlan, cancellation: CancellationToken) -> OrchestrationResult<ExecutionResult> {
        plan.validate()?;

        let started_at = now_ms();
        let request_id = plan.plan_id.clone();
        let mut plan = plan.clone();

        if let Some(hitl) = &self.hitl {
            if let Some((checkpoint_id, outcome)) =
                consult_hitl(hitl, &request_id, InterruptPoint::PlanGenerated, None, plan.clone(), &[], &cancellation).await?
            {
                match outcome {
                    ResumeOutcome::Approved => {}
                    ResumeOutcome::Modified { parameters, replacement_plan } => {
                        if let Some(new_plan) = replacement_plan {
                            new_plan.validate()?;
                            plan = new_plan;
                        } else if parameters.is_some() {
                            warn!(request_id = %request_id, "plan_generated modify carried step parameters rather than a replacement plan; ignored at plan level");
                        }
                    }
                    ResumeOutcome::Rejected(reason) => {
                        return Err(HitlError::Rejected { checkpoint_id, reason }.into());
                    }
                    ResumeOutcome::Cancelled => return Err(ExecutorError::Cancelled.into()),
                }
            }
        }

        let plan = plan;
        let executed: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));
        let results: Arc<Mutex<HashMap<String, StepResult>>> = Arc::new(Mutex::new(HashMap::new()));
        let completion_order: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));

        loop {
            let executed_snapshot = executed.lock().clone();
            if executed_snapshot.len() >= plan.steps.len() {
                break;
            }

            if cancellation.is_cancelled() {
                return Err(ExecutorError::Cancelled.into());
            }

            let ready = ready_set(&plan, &executed_snapshot, &results.lock());

            if ready.is_empty() {
                let skipped = skip_steps_with_failed_dependency(&plan, &executed_snapshot, &results.lock());
                if skipped.is_empty() {
                    return Err(ExecutorError::Stalled.into());
                }
                let now = now_ms();
                let mut results_guard = results.lock();
                let mut executed_guard = executed.lock();
                let mut order_guard = completion_order.lock();
                for step_id in skipped {
                    results_guard.insert(step_id.clone(), StepResult::skipped(&step_id, now));
                    executed_guard.insert(step_id.clone());
                    order_guard.push(step_id);
                }
                continue;
            }

            // Built from `completion_order`, not `results.values()`: auto-wiring
            // (§4.E Layer 1) overrides earlier steps with later ones for the
            // same key, which only means something if "later" is the actual
            // completion order and not HashMap iteration order.
            let prior_results: Vec<StepResult> = {
                let order_guard = completion_order.lock();
                let results_guard = results.lock();
                order_guard.iter().filter_map(|id| results_guard.get(id).cloned()).collect()
            };

            let mut join_set: JoinSet<(String, StepResult)> = JoinSet::new();
            let mut task_steps: HashMap<tokio::task::Id, String> = HashMap::new();
            for step in ready {
                let step = step.clone();
                let step_id = step.step_id.clone();
                let permit = semaphore.clone().acquire_owned().await.map_err(|_| ExecutorError::Cancelled)?;
                let client = self.client.clone();
                let target = self.target.clone();
                let config = self.config.clone();
                let token = cancellation.clone();
                let prior = prior_results.clone();
                let correction = self.correction.clone();
                let hitl = self.hitl.clone();
                let request_id = request_id.clone();
                let plan_snapshot = plan.clone();
                let handle = join_set.spawn(async move {
                    let _permit = permit;
                    let result = run_step(
                        &step,
                        target.as_ref(),
                        client.as_ref(),
                        &config,
                        &token,
                        &prior,
                        correction.as_deref(),
                        hitl.as_deref(),
                        &request_id,
                        &plan_snapshot,
                    )
                    .await;
                    (step.step_id.clone(), result)
                });
                task_steps.insert(handle.id(), step_id);
            }

            while let Some(joined) = join_set.join_next_with_id().await {
                let (step_id, result) = match joined {
                    Ok((_id, pair)) => pair,
                    Err(join_err) => {
                        // The spawned task panicked or was aborted; isolate it
                        // to a single failed step rather than failing the
                        // whole plan — the id recorded at spawn time, not the
                        // join error, is what ties this back to a step.
                        let step_id = task_steps
                            .get(&join_err.id())
                            .cloned()
                            .expect("every spawned task's id was recorded before it could be joined");
                        let now = now_ms();
                        let message = if join_err.is_panic() {
                            warn!(step_id = %step_id, error = %join_err, "step task panicked, isolating as a failed step result");
                            ExecutorError::StepPanicked { step_id: step_id.clone(), message: join_err.to_string() }.to_string()
                        } else {
                            warn!(step_id = %step_id, error = %join_err, "step task was aborted, isolating as a failed step result");
                            ExecutorError::StepPanicked { step_id: step_id.clone(), message: format!("task aborted: {join_err}") }.to_string()
                        };
                        (
                            step_id.clone(),
                            StepResult {
                                step_id,
                                success: false,
                                response: None,
                                error: Some(message),
                                attempts: 0,
                                start_time: now,
                                end_time: now,
                                duration_ms: 0,
                            },
                        )
                    }
                };
                let mut results_guard = results.lock();
                let mut executed_guard = executed.lock();
                let mut order_guard = completion_order.lock();
                results_guard.insert(step_id.clone(), result);
                executed_guard.insert(step_id.clone());
                order_guard.push(step_id);
            }
        }

        let order = completion_order.lock().clone();
        let results_map = results.lock();
        let steps: Vec<StepResult> = order
            .into_iter()
            .filter_map(|id| results_map.get(&id).cloned())
            .collect();
        let success = ExecutionResult::aggregate_success(&steps);
        let total_duration_ms = now_ms() - started_at;

        Ok(ExecutionResult {
            plan_id: plan.plan_id.clone(),
            success,
            total_duration_ms,
            steps,
            metadata: HashMap::new(),
        })
    }
}

/// Steps whose dependencies are all executed and all succeeded (§4.D step 1).
fn ready_set<'a>(plan: &'a RoutingPlan, executed: &HashSet<String>, results: &HashMap<String, StepResult>) -> Vec<&'a RoutingStep> {
    plan.steps
        .iter()
        .filter(|s| !executed.contains(&s.step_id))
        .filter(|s| {
            s.depends_on
                .iter()
                .all(|d| results.get(d).map(|r| r.success).unwrap_or(false))
        })
        .collect()
}

/// Steps not yet executed that have at least one failed dependency (§4.D step 2a).
fn skip_steps_with_failed_dependency(
    plan: &RoutingPlan,
    executed: &HashSet<String>,
    results: &HashMap<String, StepResult>,
) -> Vec<String> {
    plan.steps
        .iter()
        .filter(|s| !executed.contains(&s.step_id))
        .filter(|s| {
            s.depends_on
                .iter()
                .any(|d| matches!(results.get(d), Some(r) if !r.success))
        })
        .map(|s| s.step_id.clone())
        .collect()
}

/// Consults `hitl` at `point` and, if it suspends, blocks on the resulting
/// checkpoint until a command or the wait timeout resolves it. `Ok(None)`
/// means the controller chose not to interrupt; the caller proceeds exactly
/// as it would with no HITL controller wired at all (§4.F Interrupt points).
#[allow(clippy::too_many_arguments)]
async fn consult_hitl(
    hitl: &DynHitlController,
    request_id: &str,
    point: InterruptPoint,
    step: Option<&RoutingStep>,
    plan: RoutingPlan,
    prior_results: &[StepResult],
    cancellation: &CancellationToken,
) -> OrchestrationResult<Option<(String, ResumeOutcome)>> {
    match hitl
        .consult(request_id, point, step, plan, prior_results, RequestMode::NonStreaming, HashMap::new())
        .await?
    {
        InterruptOutcome::Proceed => Ok(None),
        InterruptOutcome::Suspended(checkpoint) => {
            let checkpoint_id = checkpoint.checkpoint_id;
            let outcome = hitl.wait_for_command(&checkpoint_id, cancellation.clone()).await?;
            Ok(Some((checkpoint_id, outcome)))
        }
    }
}

/// Per-step execution with retry (§4.D Per-step execution). Parameters pass
/// through Parameter Reconciliation Layers 1/2 before the first attempt
/// (§4.E); Layer 3 gets one shot mid-retry if a `CorrectionCallback` is wired
/// and the failure looks like a parameter type mismatch. When a HITL
/// controller is wired, the step is bracketed by `before_step` (pre-dispatch)
/// and `after_step`/`on_error` (post-dispatch) consultations (§4.F).
#[allow(clippy::too_many_arguments)]
async fn run_step<T: StepTarget, C: AgentClient>(
    step: &RoutingStep,
    target: &T,
    client: &C,
    config: &ExecutorConfig,
    cancellation: &CancellationToken,
    prior_results: &[StepResult],
    correction: Option<&dyn CorrectionCallback>,
    hitl: Option<&DynHitlController>,
    request_id: &str,
    plan: &RoutingPlan,
) -> StepResult {
    let start_time = now_ms();

    let Some((agent, capability)) = target.resolve(&step.agent_name, &step.metadata.capability).await else {
        return StepResult {
            step_id: step.step_id.clone(),
            success: false,
            response: None,
            error: Some(format!("agent '{}' not found in catalog", step.agent_name)),
            attempts: 0,
            start_time,
            end_time: now_ms(),
            duration_ms: 0,
        };
    };

    let endpoint = capability.resolved_endpoint();
    let upstream = reconcile::upstream_pool(prior_results);
    let upstream_refs: Vec<(&str, &Value)> = upstream.iter().map(|(id, v)| (id.as_str(), v)).collect();
    let mut params = reconcile::reconcile(&capability, &step.metadata.parameters, &upstream_refs);

    if let Some(hitl) = hitl {
        match consult_hitl(hitl, request_id, InterruptPoint::BeforeStep, Some(step), plan.clone(), prior_results, cancellation).await {
            Ok(Some((checkpoint_id, outcome))) => match outcome {
                ResumeOutcome::Approved => {}
                ResumeOutcome::Modified { parameters, .. } => {
                    if let Some(Value::Object(map)) = parameters {
                        params.extend(map);
                    }
                }
                ResumeOutcome::Rejected(reason) => {
                    let end_time = now_ms();
                    return StepResult {
                        step_id: step.step_id.clone(),
                        success: false,
                        response: None,
                        error: Some(format!("rejected at before_step checkpoint {checkpoint_id}: {reason}")),
                        attempts: 0,
                        start_time,
                        end_time,
                        duration_ms: end_time - start_time,
                    };
                }
                ResumeOutcome::Cancelled => {
                    cancellation.cancel();
                    let end_time = now_ms();
                    return StepResult {
                        step_id: step.step_id.clone(),
                        success: false,
                        response: None,
                        error: Some(format!("cancelled at before_step checkpoint {checkpoint_id}")),
                        attempts: 0,
                        start_time,
                        end_time,
                        duration_ms: end_time - start_time,
                    };
                }
            },
            Ok(None) => {}
            Err(err) => {
                let end_time = now_ms();
                return StepResult {
                    step_id: step.step_id.clone(),
                    success: false,
                    response: None,
                    error: Some(format!("before_step HITL consultation failed: {err}")),
                    attempts: 0,
                    start_time,
                    end_time,
                    duration_ms: end_time - start_time,
                };
            }
        }
    }

    let mut attempts = 0u32;
    let mut last_error = String::new();
    let mut corrected = false;
    let mut success_response: Option<Value> = None;

    loop {
        if cancellation.is_cancelled() {
            last_error = "cancelled".to_string();
            break;
        }
        attempts += 1;

        let invoke = tokio::time::timeout(config.step_timeout, client.invoke(&agent.address, &endpoint, &params)).await;

        match invoke {
            Ok(Ok(body)) => {
                success_response = Some(body);
                break;
            }
            Ok(Err(err)) => {
                last_error = err;
            }
            Err(_) => {
                last_error = format!("timed out after {:?}", config.step_timeout);
            }
        }

        if !corrected && reconcile::looks_like_type_error(&last_error) {
            if let Some(cb) = correction {
                corrected = true;
                match cb.correct(&step.step_id, &params, &last_error, &capability).await {
                    Ok(new_params) => {
                        warn!(step_id = %step.step_id, "correction callback adjusted parameters after type-error response");
                        params = new_params;
                    }
                    Err(reason) => {
                        warn!(step_id = %step.step_id, reason = %reason, "correction callback declined to adjust parameters");
                    }
                }
            }
        }

        if attempts >= config.max_attempts {
            break;
        }

        warn!(step_id = %step.step_id, attempt = attempts, error = %last_error, "step attempt failed, retrying");
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(attempts as u64)) => {}
            _ = cancellation.cancelled() => {
                last_error = "cancelled".to_string();
                break;
            }
        }
    }

    let end_time = now_ms();
    let mut result = match success_response {
        Some(body) => StepResult {
            step_id: step.step_id.clone(),
            success: true,
            response: Some(body.to_string()),
            error: None,
            attempts,
            start_time,
            end_time,
            duration_ms: end_time - start_time,
        },
        None => StepResult {
            step_id: step.step_id.clone(),
            success: false,
            response: None,
            error: Some(last_error),
            attempts,
            start_time,
            end_time,
            duration_ms: end_time - start_time,
        },
    };

    if let Some(hitl) = hitl {
        let point = if result.success { InterruptPoint::AfterStep } else { InterruptPoint::OnError };
        match consult_hitl(hitl, request_id, point, Some(step), plan.clone(), prior_results, cancellation).await {
            Ok(Some((checkpoint_id, outcome))) => match outcome {
                ResumeOutcome::Approved => {}
                ResumeOutcome::Rejected(reason) => {
                    result.success = false;
                    result.error = Some(format!("rejected at {point:?} checkpoint {checkpoint_id}: {reason}"));
                }
                ResumeOutcome::Cancelled => {
                    cancellation.cancel();
                    result.success = false;
                    result.error = Some(format!("cancelled at {point:?} checkpoint {checkpoint_id}"));
                }
                ResumeOutcome::Modified { parameters, .. } => {
                    // A human-supplied correction after a failure gets one
                    // bounded extra attempt, mirroring Layer 3's shape; after
                    // a success there is nothing left to retry.
                    if !result.success {
                        if let Some(Value::Object(map)) = parameters {
                            let mut retry_params = params.clone();
                            retry_params.extend(map);
                            match tokio::time::timeout(config.step_timeout, client.invoke(&agent.address, &endpoint, &retry_params)).await {
                                Ok(Ok(body)) => {
                                    result = StepResult {
                                        step_id: step.step_id.clone(),
                                        success: true,
                                        response: Some(body.to_string()),
                                        error: None,
                                        attempts: result.attempts + 1,
                                        start_time,
                                        end_time: now_ms(),
                                        duration_ms: now_ms() - start_time,
                                    };
                                }
                                Ok(Err(err)) => {
                                    result.attempts += 1;
                                    result.error = Some(err);
                                }
                                Err(_) => {
                                    result.attempts += 1;
                                    result.error = Some(format!("timed out after {:?}", config.step_timeout));
                                }
                            }
                        }
                    }
                }
            },
            Ok(None) => {}
            Err(err) => {
                result.success = false;
                result.error = Some(format!("{point:?} HITL consultation failed: {err}"));
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestration::types::RoutingStep;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedTarget {
        agent: RegisteredAgent,
        capability: Capability,
    }

    #[async_trait::async_trait]
    impl StepTarget for FixedTarget {
        async fn resolve(&self, _agent_name: &str, _capability_name: &str) -> Option<(RegisteredAgent, Capability)> {
            Some((self.agent.clone(), self.capability.clone()))
        }
    }

    struct MissingTarget;

    #[async_trait::async_trait]
    impl StepTarget for MissingTarget {
        async fn resolve(&self, _agent_name: &str, _capability_name: &str) -> Option<(RegisteredAgent, Capability)> {
            None
        }
    }

    struct AlwaysOkClient {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl AgentClient for AlwaysOkClient {
        async fn invoke(
            &self,
            _address: &str,
            _endpoint: &str,
            _parameters: &HashMap<String, serde_json::Value>,
        ) -> Result<serde_json::Value, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(serde_json::json!({"ok": true}))
        }
    }

    struct AlwaysFailClient;

    #[async_trait::async_trait]
    impl AgentClient for AlwaysFailClient {
        async fn invoke(
            &self,
            _address: &str,
            _endpoint: &str,
            _parameters: &HashMap<String, serde_json::Value>,
        ) -> Result<serde_json::Value, String> {
            Err("HTTP 500".to_string())
        }
    }

    fn fixture_plan() -> RoutingPlan {
        RoutingPlan::new("p1", "req")
            .add_step(RoutingStep::new("a", "agent", "cap"))
            .add_step(RoutingStep::new("b", "agent", "cap").depends_on("a"))
            .add_step(RoutingStep::new("c", "agent", "cap").depends_on("b"))
    }

    #[tokio::test]
    async fn linear_plan_executes_in_causal_order() {
        let target = Arc::new(FixedTarget {
            agent: RegisteredAgent::new("a1", "agent", "http://agent"),
            capability: Capability::new("cap"),
        });
        let client = Arc::new(AlwaysOkClient { calls: AtomicUsize::new(0) });
        let executor = DagExecutor::new(target, client, ExecutorConfig { step_timeout: Duration::from_secs(1), ..Default::default() });

        let result = executor.execute(&fixture_plan(), CancellationToken::new()).await.unwrap();
        assert!(result.success);
        assert_eq!(result.steps.len(), 3);
        let by_id: HashMap<_, _> = result.steps.iter().map(|s| (s.step_id.clone(), s.clone())).collect();
        assert!(by_id["a"].end_time <= by_id["b"].start_time);
        assert!(by_id["b"].end_time <= by_id["c"].start_time);
    }

    #[tokio::test]
    async fn parallel_fan_out_runs_concurrently() {
        let plan = RoutingPlan::new("p1", "req")
            .add_step(RoutingStep::new("news", "agent", "cap"))
            .add_step(RoutingStep::new("price", "agent", "cap"))
            .add_step(RoutingStep::new("synth", "agent", "cap").depends_on("news").depends_on("price"));

        let target = Arc::new(FixedTarget {
            agent: RegisteredAgent::new("a1", "agent", "http://agent"),
            capability: Capability::new("cap"),
        });
        let client = Arc::new(AlwaysOkClient { calls: AtomicUsize::new(0) });
        let executor = DagExecutor::new(target, client, ExecutorConfig { max_concurrency: 2, step_timeout: Duration::from_secs(1), ..Default::default() });

        let result = executor.execute(&plan, CancellationToken::new()).await.unwrap();
        assert!(result.success);
        let by_id: HashMap<_, _> = result.steps.iter().map(|s| (s.step_id.clone(), s.clone())).collect();
        assert!(by_id["synth"].start_time >= by_id["news"].end_time.max(by_id["price"].end_time));
    }

    #[tokio::test]
    async fn failed_dependency_skips_downstream_step() {
        let target = Arc::new(FixedTarget {
            agent: RegisteredAgent::new("a1", "agent", "http://agent"),
            capability: Capability::new("cap"),
        });
        let client = Arc::new(AlwaysFailClient);
        let executor = DagExecutor::new(
            target,
            client,
            ExecutorConfig { max_attempts: 3, step_timeout: Duration::from_millis(100), ..Default::default() },
        );

        let plan = RoutingPlan::new("p1", "req")
            .add_step(RoutingStep::new("a", "agent", "cap"))
            .add_step(RoutingStep::new("b", "agent", "cap").depends_on("a"))
            .add_step(RoutingStep::new("c", "agent", "cap").depends_on("b"));

        let result = executor.execute(&plan, CancellationToken::new()).await.unwrap();
        assert!(!result.success);
        let by_id: HashMap<_, _> = result.steps.iter().map(|s| (s.step_id.clone(), s.clone())).collect();
        assert_eq!(by_id["a"].attempts, 3);
        assert!(!by_id["a"].success);
        assert_eq!(by_id["b"].attempts, 0);
        assert!(by_id["b"].error.as_deref().unwrap().contains(SKIPPED_DEPENDENCY_MARKER));
        assert!(by_id["c"].error.as_deref().unwrap().contains(SKIPPED_DEPENDENCY_MARKER));
    }

    #[tokio::test]
    async fn unknown_agent_is_a_permanent_failure() {
        let client = Arc::new(AlwaysOkClient { calls: AtomicUsize::new(0) });
        let executor = DagExecutor::new(Arc::new(MissingTarget), client, ExecutorConfig::default());
        let plan = RoutingPlan::new("p1", "req").add_step(RoutingStep::new("a", "ghost", "cap"));
        let result = executor.execute(&plan, CancellationToken::new()).await.unwrap();
        assert!(!result.success);
        assert!(result.steps[0].error.as_deref().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn cancellation_before_start_fails_the_plan() {
        let target = Arc::new(FixedTarget {
            agent: RegisteredAgent::new("a1", "agent", "http://agent"),
            capability: Capability::new("cap"),
        });
        let client = Arc::new(AlwaysOkClient { calls: AtomicUsize::new(0) });
        let executor = DagExecutor::new(target, client, ExecutorConfig::default());
        let token = CancellationToken::new();
        token.cancel();
        let plan = RoutingPlan::new("p1", "req").add_step(RoutingStep::new("a", "agent", "cap"));
        let err = executor.execute(&plan, token).await.unwrap_err();
        assert!(matches!(err, OrchestrationError::Executor(ExecutorError::Cancelled)));
    }

    struct MapTarget {
        by_agent: HashMap<String, (RegisteredAgent, Capability)>,
    }

    #[async_trait::async_trait]
    impl StepTarget for MapTarget {
        async fn resolve(&self, agent_name: &str, _capability_name: &str) -> Option<(RegisteredAgent, Capability)> {
            self.by_agent.get(agent_name).cloned()
        }
    }

    /// Returns the geocode response on the geocode agent's address, and
    /// captures whatever parameters the weather agent actually received.
    struct GeoThenWeatherClient {
        weather_params: Mutex<Option<HashMap<String, serde_json::Value>>>,
    }

    #[async_trait::async_trait]
    impl AgentClient for GeoThenWeatherClient {
        async fn invoke(
            &self,
            address: &str,
            _endpoint: &str,
            parameters: &HashMap<String, serde_json::Value>,
        ) -> Result<serde_json::Value, String> {
            if address.contains("geocode") {
                Ok(serde_json::json!({"location": {"code": "TYO", "name": "Tokyo"}}))
            } else {
                *self.weather_params.lock() = Some(parameters.clone());
                Ok(serde_json::json!({"forecast": "sunny"}))
            }
        }
    }

    #[tokio::test]
    async fn downstream_step_is_auto_wired_from_upstream_response() {
        use crate::orchestration::types::{ParameterSpec, ParameterType};

        let mut weather_cap = Capability::new("forecast");
        weather_cap.parameters.push(ParameterSpec {
            name: "code".into(),
            type_tag: ParameterType::String,
            required: true,
            description: String::new(),
            default: None,
            r#enum: None,
        });

        let mut by_agent = HashMap::new();
        by_agent.insert(
            "geocode".to_string(),
            (RegisteredAgent::new("a1", "geocode", "http://geocode"), Capability::new("lookup")),
        );
        by_agent.insert(
            "weather".to_string(),
            (RegisteredAgent::new("a2", "weather", "http://weather"), weather_cap),
        );

        let target = Arc::new(MapTarget { by_agent });
        let client = Arc::new(GeoThenWeatherClient { weather_params: Mutex::new(None) });
        let executor = DagExecutor::new(target, client.clone(), ExecutorConfig { step_timeout: Duration::from_secs(1), ..Default::default() });

        let plan = RoutingPlan::new("p1", "req")
            .add_step(RoutingStep::new("geo", "geocode", "lookup"))
            .add_step(RoutingStep::new("wx", "weather", "forecast").depends_on("geo"));

        let result = executor.execute(&plan, CancellationToken::new()).await.unwrap();
        assert!(result.success);
        let wired = client.weather_params.lock().clone().expect("weather agent was invoked");
        assert_eq!(wired.get("code"), Some(&Value::String("TYO".to_string())));
    }

    struct TypeErrorThenOkClient {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl AgentClient for TypeErrorThenOkClient {
        async fn invoke(
            &self,
            _address: &str,
            _endpoint: &str,
            parameters: &HashMap<String, serde_json::Value>,
        ) -> Result<serde_json::Value, String> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err("cannot unmarshal string into Number".to_string())
            } else {
                assert_eq!(parameters.get("lat"), Some(&serde_json::json!(35.0)));
                Ok(serde_json::json!({"ok": true}))
            }
        }
    }

    struct FixedCorrection;

    #[async_trait::async_trait]
    impl CorrectionCallback for FixedCorrection {
        async fn correct(
            &self,
            _step_id: &str,
            _original_params: &HashMap<String, serde_json::Value>,
            _error_text: &str,
            _capability: &Capability,
        ) -> Result<HashMap<String, serde_json::Value>, String> {
            let mut fixed = HashMap::new();
            fixed.insert("lat".to_string(), serde_json::json!(35.0));
            Ok(fixed)
        }
    }

    #[tokio::test]
    async fn correction_callback_fixes_parameters_after_type_error_response() {
        let target = Arc::new(FixedTarget {
            agent: RegisteredAgent::new("a1", "agent", "http://agent"),
            capability: Capability::new("cap"),
        });
        let client = Arc::new(TypeErrorThenOkClient { calls: AtomicUsize::new(0) });
        let executor = DagExecutor::new(target, client, ExecutorConfig { step_timeout: Duration::from_secs(1), ..Default::default() })
            .with_correction_callback(Arc::new(FixedCorrection));

        let plan = RoutingPlan::new("p1", "req").add_step(RoutingStep::new("a", "agent", "cap"));
        let result = executor.execute(&plan, CancellationToken::new()).await.unwrap();
        assert!(result.success);
        assert_eq!(result.steps[0].attempts, 2);
    }

    struct SometimesPanicsClient;

    #[async_trait::async_trait]
    impl AgentClient for SometimesPanicsClient {
        async fn invoke(
            &self,
            address: &str,
            _endpoint: &str,
            _parameters: &HashMap<String, serde_json::Value>,
        ) -> Result<serde_json::Value, String> {
            if address.contains("bad") {
                panic!("simulated agent client panic");
            }
            Ok(serde_json::json!({"ok": true}))
        }
    }

    #[tokio::test]
    async fn panicking_step_is_isolated_to_a_single_failed_step_result() {
        let mut by_agent = HashMap::new();
        by_agent.insert("bad".to_string(), (RegisteredAgent::new("a1", "bad", "http://bad"), Capability::new("cap")));
        by_agent.insert("good".to_string(), (RegisteredAgent::new("a2", "good", "http://good"), Capability::new("cap")));
        let target = Arc::new(MapTarget { by_agent });
        let client = Arc::new(SometimesPanicsClient);
        let executor = DagExecutor::new(
            target,
            client,
            ExecutorConfig { max_attempts: 1, step_timeout: Duration::from_secs(1), ..Default::default() },
        );

        let plan = RoutingPlan::new("p1", "req")
            .add_step(RoutingStep::new("a", "bad", "cap"))
            .add_step(RoutingStep::new("b", "good", "cap"));

        let result = executor.execute(&plan, CancellationToken::new()).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.steps.len(), 2);
        let by_id: HashMap<_, _> = result.steps.iter().map(|s| (s.step_id.clone(), s.clone())).collect();
        assert!(!by_id["a"].success);
        assert_eq!(by_id["a"].step_id, "a");
        assert!(by_id["a"].error.as_deref().unwrap().contains("panicked"));
        assert!(by_id["b"].success);
    }

    #[tokio::test]
    async fn prior_results_are_passed_to_downstream_steps_in_completion_order() {
        use crate::orchestration::types::{ParameterSpec, ParameterType};

        // Two upstream steps race to complete, both writing the same key;
        // the downstream step must see whichever finished last, not whichever
        // the results map happens to iterate first.
        let mut merge_cap = Capability::new("merge");
        merge_cap.parameters.push(ParameterSpec {
            name: "code".into(),
            type_tag: ParameterType::String,
            required: true,
            description: String::new(),
            default: None,
            r#enum: None,
        });

        let mut by_agent = HashMap::new();
        by_agent.insert("slow".to_string(), (RegisteredAgent::new("a1", "slow", "http://slow"), Capability::new("emit")));
        by_agent.insert("fast".to_string(), (RegisteredAgent::new("a2", "fast", "http://fast"), Capability::new("emit")));
        by_agent.insert("merge".to_string(), (RegisteredAgent::new("a3", "merge", "http://merge"), merge_cap));

        struct StaggeredClient;

        #[async_trait::async_trait]
        impl AgentClient for StaggeredClient {
            async fn invoke(
                &self,
                address: &str,
                _endpoint: &str,
                parameters: &HashMap<String, serde_json::Value>,
            ) -> Result<serde_json::Value, String> {
                if address.contains("slow") {
                    tokio::time::sleep(Duration::from_millis(40)).await;
                    Ok(serde_json::json!({"code": "SLOW"}))
                } else if address.contains("fast") {
                    Ok(serde_json::json!({"code": "FAST"}))
                } else {
                    Ok(serde_json::json!({"received": parameters.get("code").cloned()}))
                }
            }
        }

        let target = Arc::new(MapTarget { by_agent });
        let client = Arc::new(StaggeredClient);
        let executor =
            DagExecutor::new(target, client, ExecutorConfig { step_timeout: Duration::from_secs(1), ..Default::default() });

        let plan = RoutingPlan::new("p1", "req")
            .add_step(RoutingStep::new("slow", "slow", "emit"))
            .add_step(RoutingStep::new("fast", "fast", "emit"))
            .add_step(RoutingStep::new("merge", "merge", "merge").depends_on("slow").depends_on("fast"));

        let result = executor.execute(&plan, CancellationToken::new()).await.unwrap();
        assert!(result.success);
        let by_id: HashMap<_, _> = result.steps.iter().map(|s| (s.step_id.clone(), s.clone())).collect();
        let merged = by_id["merge"].response.as_deref().unwrap();
        assert!(merged.contains("SLOW"), "expected the later-completing step's value to win, got {merged}");
    }

    use crate::orchestration::hitl::HitlConfig;
    use crate::orchestration::store::InMemoryCheckpointStore;
    use crate::orchestration::types::{Command, CommandType, ExecutionCheckpoint};

    /// Relays every checkpoint id it is notified about to the test so it can
    /// publish a command on the same store the controller reads from,
    /// without reaching into the controller's private fields.
    struct RelayNotifier {
        tx: tokio::sync::mpsc::UnboundedSender<String>,
    }

    #[async_trait::async_trait]
    impl CommandNotifier for RelayNotifier {
        async fn notify_interrupt(&self, checkpoint: &ExecutionCheckpoint) -> Result<(), String> {
            let _ = self.tx.send(checkpoint.checkpoint_id.clone());
            Ok(())
        }
    }

    fn hitl_controller_with_store() -> (Arc<DynHitlController>, Arc<InMemoryCheckpointStore>, tokio::sync::mpsc::UnboundedReceiver<String>) {
        let store = Arc::new(InMemoryCheckpointStore::new());
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let notifier: Arc<dyn CommandNotifier> = Arc::new(RelayNotifier { tx });
        let store_dyn: Arc<dyn CheckpointStore> = store.clone();
        let controller = Arc::new(HitlController::new(
            store_dyn,
            notifier,
            HitlConfig { wait_timeout: Duration::from_millis(500), ..Default::default() },
        ));
        (controller, store, rx)
    }

    #[tokio::test]
    async fn before_step_approval_gate_suspends_then_resumes_on_approve() {
        let target = Arc::new(FixedTarget {
            agent: RegisteredAgent::new("a1", "agent", "http://agent"),
            capability: Capability::new("cap"),
        });
        let client = Arc::new(AlwaysOkClient { calls: AtomicUsize::new(0) });
        let (hitl, store, mut checkpoint_ids) = hitl_controller_with_store();
        let executor =
            DagExecutor::new(target, client, ExecutorConfig { step_timeout: Duration::from_secs(1), ..Default::default() })
                .with_hitl_controller(hitl);

        let mut step = RoutingStep::new("a", "agent", "cap");
        step.require_approval = true;
        let plan = RoutingPlan::new("p1", "req").add_step(step);

        let approver = tokio::spawn(async move {
            let checkpoint_id = checkpoint_ids.recv().await.expect("checkpoint notified");
            store
                .publish_command(Command {
                    checkpoint_id,
                    command_type: CommandType::Approve,
                    user_id: "reviewer".to_string(),
                    timestamp: 0,
                    modified_parameters: None,
                    comment: None,
                })
                .await
                .unwrap();
        });

        let result = executor.execute(&plan, CancellationToken::new()).await.unwrap();
        approver.await.unwrap();
        assert!(result.success);
        assert_eq!(result.steps[0].attempts, 1);
    }

    #[tokio::test]
    async fn before_step_rejection_fails_just_that_step() {
        let target = Arc::new(FixedTarget {
            agent: RegisteredAgent::new("a1", "agent", "http://agent"),
            capability: Capability::new("cap"),
        });
        let client = Arc::new(AlwaysOkClient { calls: AtomicUsize::new(0) });
        let (hitl, store, mut checkpoint_ids) = hitl_controller_with_store();
        let executor =
            DagExecutor::new(target, client, ExecutorConfig { step_timeout: Duration::from_secs(1), ..Default::default() })
                .with_hitl_controller(hitl);

        let mut step = RoutingStep::new("a", "agent", "cap");
        step.require_approval = true;
        let plan = RoutingPlan::new("p1", "req").add_step(step);

        let rejecter = tokio::spawn(async move {
            let checkpoint_id = checkpoint_ids.recv().await.expect("checkpoint notified");
            store
                .publish_command(Command {
                    checkpoint_id,
                    command_type: CommandType::Reject,
                    user_id: "reviewer".to_string(),
                    timestamp: 0,
                    modified_parameters: None,
                    comment: Some("not today".to_string()),
                })
                .await
                .unwrap();
        });

        let result = executor.execute(&plan, CancellationToken::new()).await.unwrap();
        rejecter.await.unwrap();
        assert!(!result.success);
        assert!(result.steps[0].error.as_deref().unwrap().contains("not today"));
    }
}
