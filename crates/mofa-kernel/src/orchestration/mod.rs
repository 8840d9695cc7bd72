//! Multi-agent orchestration runtime core.
//!
//! A capability-driven planner and DAG executor coordinate calls across a
//! catalog of remote HTTP agents: [`catalog`] maintains the live set of
//! agents and capabilities, [`traits::Planner`] turns a natural-language
//! request plus the catalog's rendered text into a [`types::RoutingPlan`],
//! [`executor`] runs that plan with bounded concurrency, [`reconcile`] fills
//! in step parameters the planner left implicit, and [`hitl`] lets a human
//! suspend and resume execution at named interrupt points.
//!
//! This crate holds only the trait contracts and the logic that does not
//! need a network: HTTP/LLM-backed implementations of [`traits::AgentClient`],
//! [`traits::CapabilityFetcher`], [`traits::LlmClient`], [`traits::Planner`]
//! (the [`traits::CapabilityProvider`] variants), and [`traits::CommandNotifier`]
//! live in `mofa-foundation`.

pub mod audit;
pub mod catalog;
pub mod config;
pub mod error;
pub mod executor;
pub mod hitl;
pub mod reconcile;
pub mod store;
pub mod traits;
pub mod types;

pub use catalog::{AgentCatalog, NoopCapabilityFetcher, StaticAgentDiscovery};
pub use config::RuntimeConfig;
pub use error::{OrchestrationError, OrchestrationResult};
pub use executor::{DagExecutor, ExecutorConfig, StepTarget};
pub use hitl::{DefaultAction, HitlConfig, HitlController, InterruptOutcome, ResumeOutcome};
pub use store::InMemoryCheckpointStore;
pub use audit::InMemoryExecutionStore;
pub use types::{
    Capability, Command, CommandType, ExecutionCheckpoint, ExecutionResult, ParameterSpec, ParameterType, RegisteredAgent, RoutingPlan,
    RoutingStep, StepResult,
};
