//! Concrete, network-reaching implementations of the `mofa-kernel`
//! orchestration trait contracts: an LLM-backed planner, HTTP-backed
//! capability fetch/invocation, the `CapabilityProvider` strategy variants,
//! and the outbound HITL webhook notifier.

mod http_client;
mod llm_adapter;
mod planner;
mod provider;
mod webhook;

pub use http_client::{ReqwestAgentClient, ReqwestCapabilityFetcher};
pub use llm_adapter::ProviderLlmClient;
pub use planner::LlmPlanner;
pub use provider::{DirectProvider, ServiceProvider, TieredProvider, MIN_TOOLS_FOR_TIERING};
pub use webhook::WebhookNotifier;
