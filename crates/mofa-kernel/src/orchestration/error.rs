//! Error types for the orchestration runtime.
//!
//! One `thiserror` enum per component boundary, following the structured-variant
//! style of [`crate::agent::error::AgentError`], plus a crate-level
//! [`OrchestrationError`] that `#[from]`-wraps each for cross-boundary `?`.

use thiserror::Error;

pub type OrchestrationResult<T> = Result<T, OrchestrationError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("agent not found: {0}")]
    AgentNotFound(String),

    #[error("capability '{capability}' not found on agent '{agent}'")]
    CapabilityNotFound { agent: String, capability: String },

    #[error("discovery source failed: {0}")]
    DiscoveryFailed(String),
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("capability service returned an error: {0}")]
    ServiceCallFailed(String),

    #[error("circuit breaker open for capability service")]
    CircuitOpen,

    #[error("no fallback provider configured and primary path is unavailable")]
    NoFallback,
}

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("LLM call failed: {0}")]
    LlmCallFailed(String),

    #[error("failed to extract JSON from LLM output: {0}")]
    JsonExtractionFailed(String),

    #[error("plan failed validation: {0}")]
    PlanInvalid(String),

    #[error("planner exhausted {attempts} retr{suffix}", suffix = if *attempts == 1 { "y" } else { "ies" })]
    RetriesExhausted { attempts: u32 },
}

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("step '{0}' not found in catalog: target agent is unknown")]
    AgentNotFound(String),

    #[error("no executable steps remain — check for circular dependencies")]
    Stalled,

    #[error("execution cancelled")]
    Cancelled,

    #[error("step '{step_id}' panicked: {message}")]
    StepPanicked { step_id: String, message: String },
}

#[derive(Debug, Error)]
pub enum ReconciliationError {
    #[error("could not coerce parameter '{name}' to {expected}")]
    CoercionFailed { name: String, expected: String },

    #[error("correction callback failed: {0}")]
    CorrectionFailed(String),
}

#[derive(Debug, Error)]
pub enum HitlError {
    #[error("checkpoint not found: {0}")]
    CheckpointNotFound(String),

    #[error("checkpoint expired: {0}")]
    Expired(String),

    #[error("execution rejected at checkpoint {checkpoint_id}: {reason}")]
    Rejected { checkpoint_id: String, reason: String },

    #[error("execution cancelled at checkpoint {0}")]
    Cancelled(String),

    #[error("checkpoint {0} is awaiting approval")]
    AwaitingApproval(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("claim already held for {0}")]
    ClaimHeld(String),
}

/// Malformed `RoutingPlan`, independent of which component noticed it.
#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error("invalid plan: {0}")]
    InvalidPlan(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Planner(#[from] PlannerError),

    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error(transparent)]
    Reconciliation(#[from] ReconciliationError),

    #[error(transparent)]
    Hitl(#[from] HitlError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serde(String),
}

impl From<std::io::Error> for OrchestrationError {
    fn from(err: std::io::Error) -> Self {
        OrchestrationError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for OrchestrationError {
    fn from(err: serde_json::Error) -> Self {
        OrchestrationError::Serde(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retries_exhausted_pluralizes_message() {
        let err = PlannerError::RetriesExhausted { attempts: 1 };
        assert!(err.to_string().contains("1 retry"));
        let err = PlannerError::RetriesExhausted { attempts: 2 };
        assert!(err.to_string().contains("2 retries"));
    }

    #[test]
    fn cross_boundary_conversion_preserves_message() {
        let err: OrchestrationError = CatalogError::AgentNotFound("geocode".into()).into();
        assert!(err.to_string().contains("geocode"));
    }
}
