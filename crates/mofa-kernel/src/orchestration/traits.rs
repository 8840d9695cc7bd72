//! Trait contracts for the orchestration runtime.
//!
//! Each trait models one of the "dynamic polymorphism → interface + variants"
//! seams called out in SPEC_FULL.md §9: a small, finite set of concrete
//! implementations, no inheritance hierarchies. Concrete HTTP/LLM-backed
//! implementations live in `mofa-foundation`; this crate stays free of a
//! `reqwest` dependency so the contracts and the pure scheduling/reconciliation
//! logic can be exercised in tests without a network.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

use super::error::{CatalogError, OrchestrationResult, PlannerError, ProviderError};
use super::types::{Capability, Command, ExecutionCheckpoint, RegisteredAgent, RoutingPlan};

/// Out-of-scope collaborator (§1): supplies the full set of currently-registered
/// agents. The reference in-memory catalog in `catalog.rs` is generic over this
/// trait so it can be exercised against a static test fixture.
#[async_trait]
pub trait AgentDiscovery: Send + Sync {
    async fn list_agents(&self) -> OrchestrationResult<Vec<RegisteredAgent>>;
}

/// Abstracts the HTTP GET to an agent's `/api/capabilities` endpoint (§4.A
/// Refresh algorithm step 2) so the catalog itself has no `reqwest` dependency.
#[async_trait]
pub trait CapabilityFetcher: Send + Sync {
    async fn fetch_capabilities(&self, agent: &RegisteredAgent) -> OrchestrationResult<Vec<Capability>>;
}

/// Abstracts the POST to a step's resolved endpoint (§4.D Per-step execution).
#[async_trait]
pub trait AgentClient: Send + Sync {
    /// Returns the raw JSON response body on success, or an error string
    /// describing the non-200 status / transport failure on failure. The
    /// executor is responsible for retry; this trait performs one attempt.
    async fn invoke(
        &self,
        address: &str,
        endpoint: &str,
        parameters: &HashMap<String, Value>,
    ) -> Result<Value, String>;
}

/// A single `Complete(prompt, options) -> (text, usage)` call (§6.2).
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str, options: LlmCallOptions) -> Result<LlmCompletion, PlannerError>;
}

#[derive(Debug, Clone)]
pub struct LlmCallOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    pub model: Option<String>,
}

impl Default for LlmCallOptions {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: 2048,
            model: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmCompletion {
    pub content: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Renders the subset of capabilities visible to the planner (§4.B).
#[async_trait]
pub trait CapabilityProvider: Send + Sync {
    /// Returns (rendered capability text, list of public agent names considered).
    async fn render(&self, query: &str) -> Result<RenderedCapabilities, ProviderError>;
}

#[derive(Debug, Clone, Default)]
pub struct RenderedCapabilities {
    pub text: String,
    pub agent_names: Vec<String>,
}

/// Builds a `RoutingPlan` from capability text + a user request (§4.C).
#[async_trait]
pub trait Planner: Send + Sync {
    async fn plan(&self, request: &str, capability_text: &str, known_agents: &[String]) -> OrchestrationResult<RoutingPlan>;
}

/// Checkpoint + command durable store (§4.G).
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn save(&self, checkpoint: ExecutionCheckpoint) -> OrchestrationResult<()>;
    async fn load(&self, checkpoint_id: &str) -> OrchestrationResult<ExecutionCheckpoint>;
    async fn update_status(
        &self,
        checkpoint_id: &str,
        status: super::types::CheckpointStatus,
    ) -> OrchestrationResult<ExecutionCheckpoint>;
    async fn list_pending(&self, request_id: Option<&str>) -> OrchestrationResult<Vec<ExecutionCheckpoint>>;
    async fn delete(&self, checkpoint_id: &str) -> OrchestrationResult<()>;
    async fn claim_expired(&self, checkpoint_id: &str) -> OrchestrationResult<bool>;
    async fn release_claim(&self, checkpoint_id: &str) -> OrchestrationResult<()>;
    async fn publish_command(&self, command: Command) -> OrchestrationResult<()>;
    /// Registers interest in the next command for `checkpoint_id`. Returns a
    /// one-shot receiver; the controller awaits it with a timeout.
    async fn subscribe_command(&self, checkpoint_id: &str) -> OrchestrationResult<tokio::sync::oneshot::Receiver<Command>>;
}

/// Out-of-band HITL notification (§6.4 outbound webhook). Implemented over
/// `reqwest` in `mofa-foundation`; the controller only depends on this trait.
#[async_trait]
pub trait CommandNotifier: Send + Sync {
    async fn notify_interrupt(&self, checkpoint: &ExecutionCheckpoint) -> Result<(), String>;
}

/// Optional audit record of completed plan+result (§4.H).
#[async_trait]
pub trait ExecutionStore: Send + Sync {
    async fn record(&self, result: &super::types::ExecutionResult) -> OrchestrationResult<()>;
    async fn list_recent(&self, limit: usize) -> OrchestrationResult<Vec<super::types::ExecutionResult>>;
}

/// Correction callback for Parameter Reconciliation Layer 3 (§4.E).
#[async_trait]
pub trait CorrectionCallback: Send + Sync {
    async fn correct(
        &self,
        step_id: &str,
        original_params: &HashMap<String, Value>,
        error_text: &str,
        capability: &Capability,
    ) -> Result<HashMap<String, Value>, String>;
}

/// Surface used by [`AgentDiscovery`]/[`CapabilityFetcher`] failures that the
/// catalog reports but does not itself retry.
pub type DiscoveryResult<T> = Result<T, CatalogError>;
