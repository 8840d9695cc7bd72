//! Data model for the multi-agent orchestration runtime.
//!
//! Mirrors the shape of [`crate::workflow::planning::Plan`] /
//! [`crate::workflow::planning::PlanStep`] but widened to the catalog-routing
//! vocabulary: steps target a cataloged `(agent, capability)` pair instead of
//! a free-form tool name, and carry `metadata.capability` /
//! `metadata.parameters` rather than an untyped tool list.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{OrchestrationError, OrchestrationResult};

// ─────────────────────────────────────────────────────────────────────────────
// Parameters & capabilities
// ─────────────────────────────────────────────────────────────────────────────

/// Closed set of scalar parameter types a capability may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
}

/// One declared parameter of a [`Capability`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub type_tag: ParameterType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#enum: Option<Vec<Value>>,
}

/// A named, typed callable advertised by an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capability {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Advertised invocation path. Defaults to `/api/<capability_name>` when absent
    /// (§4.D Per-step execution, step 2).
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
    #[serde(default)]
    pub returns: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
    /// Pre-computed summary (≤2 sentences); derived from `description` when absent.
    #[serde(default)]
    pub summary: Option<String>,
    /// Internal capabilities are invokable but hidden from the planner.
    #[serde(default)]
    pub internal: bool,
}

impl Capability {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            endpoint: None,
            parameters: Vec::new(),
            returns: String::new(),
            tags: Vec::new(),
            examples: Vec::new(),
            summary: None,
            internal: false,
        }
    }

    /// Derive a ≤2-sentence summary from `description` when no explicit one was set.
    pub fn summary_or_derive(&self) -> String {
        if let Some(s) = &self.summary {
            return s.clone();
        }
        derive_summary(&self.description)
    }

    pub fn resolved_endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("/api/{}", self.name))
    }
}

/// First-two-sentences derivation used when a capability has no explicit summary
/// (§4.A Summary derivation).
pub fn derive_summary(description: &str) -> String {
    let mut sentences = Vec::with_capacity(2);
    let mut start = 0;
    for (idx, ch) in description.char_indices() {
        if matches!(ch, '.' | '!' | '?') {
            let end = idx + ch.len_utf8();
            let sentence = description[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            start = end;
            if sentences.len() == 2 {
                break;
            }
        }
    }
    if sentences.is_empty() {
        return description.trim().to_string();
    }
    sentences.join(" ")
}

// ─────────────────────────────────────────────────────────────────────────────
// Registered agent
// ─────────────────────────────────────────────────────────────────────────────

/// Health marker for a cataloged agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[non_exhaustive]
pub enum AgentHealth {
    Healthy,
    Degraded(String),
    Unhealthy(String),
    #[default]
    Unknown,
}

/// A single catalog entry: a remote agent and its advertised capabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredAgent {
    pub agent_id: String,
    pub name: String,
    pub address: String,
    pub capabilities: Vec<Capability>,
    #[serde(default)]
    pub last_seen: i64,
    #[serde(default)]
    pub health: AgentHealth,
}

impl RegisteredAgent {
    pub fn new(agent_id: impl Into<String>, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            name: name.into(),
            address: address.into(),
            capabilities: Vec::new(),
            last_seen: 0,
            health: AgentHealth::Unknown,
        }
    }

    pub fn public_capabilities(&self) -> impl Iterator<Item = &Capability> {
        self.capabilities.iter().filter(|c| !c.internal)
    }

    pub fn find_capability(&self, name: &str) -> Option<&Capability> {
        self.capabilities.iter().find(|c| c.name == name)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Routing plan
// ─────────────────────────────────────────────────────────────────────────────

/// One edge in a [`RoutingPlan`]: target = (agent, capability), inputs = parameters map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingStep {
    pub step_id: String,
    pub agent_name: String,
    pub metadata: StepMetadata,
    #[serde(default)]
    pub instruction: String,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    /// Declarative HITL policy flags (§4.F) — not runtime logic, pure data.
    #[serde(default)]
    pub require_approval: bool,
    #[serde(default)]
    pub validate_output: bool,
}

/// `metadata.capability` / `metadata.parameters` as named in §3.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepMetadata {
    pub capability: String,
    #[serde(default)]
    pub parameters: HashMap<String, Value>,
}

impl RoutingStep {
    pub fn new(step_id: impl Into<String>, agent_name: impl Into<String>, capability: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            agent_name: agent_name.into(),
            metadata: StepMetadata {
                capability: capability.into(),
                parameters: HashMap::new(),
            },
            instruction: String::new(),
            depends_on: Vec::new(),
            namespace: None,
            require_approval: false,
            validate_output: false,
        }
    }

    pub fn depends_on(mut self, step_id: impl Into<String>) -> Self {
        self.depends_on.push(step_id.into());
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.parameters.insert(key.into(), value);
        self
    }
}

/// A DAG of [`RoutingStep`]s produced by the Planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingPlan {
    pub plan_id: String,
    pub original_request: String,
    #[serde(default)]
    pub mode: String,
    pub steps: Vec<RoutingStep>,
}

impl RoutingPlan {
    pub fn new(plan_id: impl Into<String>, original_request: impl Into<String>) -> Self {
        Self {
            plan_id: plan_id.into(),
            original_request: original_request.into(),
            mode: String::new(),
            steps: Vec::new(),
        }
    }

    pub fn add_step(mut self, step: RoutingStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Validates structural invariants (§3 RoutingPlan):
    /// - `depends_on` references resolve inside the plan.
    /// - the induced graph is acyclic.
    ///
    /// Hallucinated-agent checking against a live catalog is a separate step
    /// ([`RoutingPlan::hallucinated_steps`]) since it needs catalog access this
    /// pure structural check does not.
    pub fn validate(&self) -> OrchestrationResult<()> {
        let ids: HashSet<&str> = self.steps.iter().map(|s| s.step_id.as_str()).collect();
        if ids.len() != self.steps.len() {
            return Err(OrchestrationError::InvalidPlan(
                "plan contains duplicate step ids".into(),
            ));
        }
        if self.steps.is_empty() {
            return Err(OrchestrationError::InvalidPlan("plan has no steps".into()));
        }
        for step in &self.steps {
            for dep in &step.depends_on {
                if !ids.contains(dep.as_str()) {
                    return Err(OrchestrationError::InvalidPlan(format!(
                        "step '{}' depends on non-existent step '{}'",
                        step.step_id, dep
                    )));
                }
            }
        }
        self.topological_order().map(|_| ())
    }

    /// Kahn's-algorithm topological sort with a deterministic, sorted-queue
    /// ordering (so tests are stable). Returns `Err` on a cycle.
    pub fn topological_order(&self) -> OrchestrationResult<Vec<String>> {
        let mut in_degree: HashMap<&str, usize> = HashMap::new();
        let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();

        for step in &self.steps {
            in_degree.entry(step.step_id.as_str()).or_insert(0);
            adjacency.entry(step.step_id.as_str()).or_default();
            for dep in &step.depends_on {
                adjacency.entry(dep.as_str()).or_default().push(step.step_id.as_str());
                *in_degree.entry(step.step_id.as_str()).or_insert(0) += 1;
            }
        }

        let mut queue: Vec<&str> = in_degree
            .iter()
            .filter(|&(_, &deg)| deg == 0)
            .map(|(&id, _)| id)
            .collect();
        queue.sort();

        let mut order = Vec::with_capacity(self.steps.len());
        while let Some(node) = queue.pop() {
            order.push(node.to_string());
            if let Some(children) = adjacency.get(node) {
                for &child in children {
                    let deg = in_degree.get_mut(child).unwrap();
                    *deg -= 1;
                    if *deg == 0 {
                        let pos = queue.binary_search(&child).unwrap_or_else(|p| p);
                        queue.insert(pos, child);
                    }
                }
            }
        }

        if order.len() != self.steps.len() {
            return Err(OrchestrationError::InvalidPlan(
                "plan dependency graph contains a cycle".into(),
            ));
        }
        Ok(order)
    }

    /// Step ids whose `agent_name` is not present in `known_agents` (§3: "every
    /// `agent_name` that appears must be a currently-cataloged agent").
    pub fn hallucinated_steps<'a>(&'a self, known_agents: &HashSet<String>) -> Vec<&'a str> {
        self.steps
            .iter()
            .filter(|s| !known_agents.contains(&s.agent_name))
            .map(|s| s.step_id.as_str())
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Execution results
// ─────────────────────────────────────────────────────────────────────────────

/// Marker recorded on a step skipped because one of its dependencies failed
/// (§4.D step 2a, §7 taxonomy item 4).
pub const SKIPPED_DEPENDENCY_MARKER: &str = "skipped due to failed dependency";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub step_id: String,
    pub success: bool,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    pub attempts: u32,
    pub start_time: i64,
    pub end_time: i64,
    pub duration_ms: i64,
}

impl StepResult {
    pub fn skipped(step_id: impl Into<String>, now: i64) -> Self {
        Self {
            step_id: step_id.into(),
            success: false,
            response: None,
            error: Some(SKIPPED_DEPENDENCY_MARKER.to_string()),
            attempts: 0,
            start_time: now,
            end_time: now,
            duration_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub plan_id: String,
    pub success: bool,
    pub total_duration_ms: i64,
    /// Completion order, not declaration order (§5 Ordering guarantees).
    pub steps: Vec<StepResult>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl ExecutionResult {
    pub fn aggregate_success(steps: &[StepResult]) -> bool {
        steps.iter().all(|s| s.success)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HITL checkpoint & command
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointStatus {
    Pending,
    Approved,
    Rejected,
    Modified,
    Expired,
    Cancelled,
}

impl CheckpointStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterruptPoint {
    PlanGenerated,
    BeforeStep,
    AfterStep,
    OnError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestMode {
    Streaming,
    NonStreaming,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionPayload {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionCheckpoint {
    pub checkpoint_id: String,
    pub request_id: String,
    pub status: CheckpointStatus,
    pub interrupt_point: InterruptPoint,
    pub plan: RoutingPlan,
    #[serde(default)]
    pub current_step: Option<String>,
    #[serde(default)]
    pub decision: DecisionPayload,
    pub created_at: i64,
    pub expires_at: i64,
    pub request_mode: RequestMode,
    #[serde(default)]
    pub user_context: HashMap<String, Value>,
    pub original_request: String,
}

impl ExecutionCheckpoint {
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandType {
    Approve,
    Reject,
    Modify,
    Cancel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    pub checkpoint_id: String,
    #[serde(rename = "type")]
    pub command_type: CommandType,
    pub user_id: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub modified_parameters: Option<Value>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_summary_takes_first_two_sentences() {
        let desc = "First sentence. Second sentence! Third sentence, ignored.";
        assert_eq!(derive_summary(desc), "First sentence. Second sentence!");
    }

    #[test]
    fn derive_summary_falls_back_to_whole_string_without_delimiters() {
        assert_eq!(derive_summary("no punctuation here"), "no punctuation here");
    }

    #[test]
    fn plan_validate_rejects_duplicate_ids() {
        let plan = RoutingPlan::new("p1", "req")
            .add_step(RoutingStep::new("s1", "a", "c"))
            .add_step(RoutingStep::new("s1", "b", "c"));
        assert!(plan.validate().is_err());
    }

    #[test]
    fn plan_validate_rejects_dangling_dependency() {
        let plan = RoutingPlan::new("p1", "req")
            .add_step(RoutingStep::new("s1", "a", "c").depends_on("missing"));
        assert!(plan.validate().is_err());
    }

    #[test]
    fn plan_validate_rejects_cycle() {
        let plan = RoutingPlan::new("p1", "req")
            .add_step(RoutingStep::new("s1", "a", "c").depends_on("s2"))
            .add_step(RoutingStep::new("s2", "b", "c").depends_on("s1"));
        assert!(plan.validate().is_err());
    }

    #[test]
    fn plan_validate_accepts_linear_chain() {
        let plan = RoutingPlan::new("p1", "req")
            .add_step(RoutingStep::new("s1", "geocode", "lookup"))
            .add_step(RoutingStep::new("s2", "weather", "fetch").depends_on("s1"))
            .add_step(RoutingStep::new("s3", "summarize", "write").depends_on("s2"));
        plan.validate().unwrap();
        assert_eq!(plan.topological_order().unwrap(), vec!["s1", "s2", "s3"]);
    }

    #[test]
    fn hallucinated_steps_flags_unknown_agents() {
        let plan = RoutingPlan::new("p1", "req")
            .add_step(RoutingStep::new("s1", "known", "c"))
            .add_step(RoutingStep::new("s2", "unknown", "c"));
        let known: HashSet<String> = ["known".to_string()].into_iter().collect();
        assert_eq!(plan.hallucinated_steps(&known), vec!["s2"]);
    }
}
