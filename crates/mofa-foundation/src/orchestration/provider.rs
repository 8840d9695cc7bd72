//! `CapabilityProvider` strategy implementations (§4.B): Direct, Service and
//! Tiered variants of the subset of capabilities rendered to the planner.
//!
//! The Service variant's resilience ladder and the Tiered variant's Tier 1
//! selection call are grounded on two different teacher modules: the circuit
//! breaker reuses [`mofa_kernel::workflow::policy::CircuitBreakerState`]
//! verbatim (Closed/Open/HalfOpen, `record_success`/`record_failure`/`state`),
//! and the Tier 1 LLM call follows [`crate::llm::llm_planner::LLMPlanner`]'s
//! "ask for a JSON array, validate every entry against a known set" idiom.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{instrument, warn};

use mofa_kernel::orchestration::catalog::AgentCatalog;
use mofa_kernel::orchestration::error::ProviderError;
use mofa_kernel::orchestration::traits::{
    AgentDiscovery, CapabilityFetcher, CapabilityProvider, LlmCallOptions, LlmClient, RenderedCapabilities,
};
use mofa_kernel::workflow::policy::{CircuitBreakerState, CircuitState};

/// §4.B Variant 1: hands the planner the full, unfiltered catalog text.
pub struct DirectProvider<D: AgentDiscovery, F: CapabilityFetcher> {
    catalog: Arc<AgentCatalog<D, F>>,
}

impl<D: AgentDiscovery, F: CapabilityFetcher> DirectProvider<D, F> {
    pub fn new(catalog: Arc<AgentCatalog<D, F>>) -> Self {
        Self { catalog }
    }
}

#[async_trait::async_trait]
impl<D: AgentDiscovery + Send + Sync, F: CapabilityFetcher + Send + Sync> CapabilityProvider for DirectProvider<D, F> {
    async fn render(&self, _query: &str) -> Result<RenderedCapabilities, ProviderError> {
        let text = self.catalog.format_for_llm().await;
        let agent_names: Vec<String> = self.catalog.agents().await.into_iter().map(|a| a.name).collect();
        Ok(RenderedCapabilities { text, agent_names })
    }
}

/// Wire shape of the external capability service's `POST /capabilities`
/// response (§4.B Variant 2).
#[derive(Debug, Deserialize)]
struct ServiceResponse {
    #[serde(default)]
    text: String,
    #[serde(default)]
    agent_names: Vec<String>,
}

/// §4.B Variant 2: delegates selection to an external HTTP service, wrapped
/// in the documented three-layer resilience pattern.
pub struct ServiceProvider {
    client: Client,
    service_url: String,
    top_k: usize,
    threshold: f64,
    max_attempts: u32,
    /// (a) an injected breaker takes priority over (b) the built-in one.
    injected_breaker: Option<CircuitBreakerState>,
    built_in_breaker: CircuitBreakerState,
    /// (c) consulted when the primary path is open or exhausted.
    fallback: Option<Arc<dyn CapabilityProvider>>,
}

impl ServiceProvider {
    pub fn new(service_url: impl Into<String>, top_k: usize, threshold: f64) -> Self {
        Self {
            client: Client::builder().timeout(Duration::from_secs(10)).build().expect("failed to build reqwest client"),
            service_url: service_url.into(),
            top_k,
            threshold,
            max_attempts: 3,
            injected_breaker: None,
            built_in_breaker: CircuitBreakerState::new(5, Duration::from_secs(30)),
            fallback: None,
        }
    }

    pub fn with_circuit_breaker(mut self, breaker: CircuitBreakerState) -> Self {
        self.injected_breaker = Some(breaker);
        self
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn CapabilityProvider>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    fn breaker(&self) -> &CircuitBreakerState {
        self.injected_breaker.as_ref().unwrap_or(&self.built_in_breaker)
    }

    async fn call_service(&self, query: &str) -> Result<RenderedCapabilities, String> {
        let body = json!({
            "query": query,
            "metadata": {},
            "top_k": self.top_k,
            "threshold": self.threshold,
        });

        let mut last_err = String::new();
        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                tokio::time::sleep(Duration::from_millis(200 * attempt as u64)).await;
            }
            match self.client.post(&self.service_url).json(&body).send().await {
                Ok(response) if response.status().is_success() => {
                    return response
                        .json::<ServiceResponse>()
                        .await
                        .map(|r| RenderedCapabilities { text: r.text, agent_names: r.agent_names })
                        .map_err(|e| format!("undecodable capability service response: {e}"));
                }
                Ok(response) => last_err = format!("capability service returned HTTP {}", response.status()),
                Err(e) => last_err = format!("capability service call failed: {e}"),
            }
        }
        Err(last_err)
    }
}

#[async_trait::async_trait]
impl CapabilityProvider for ServiceProvider {
    #[instrument(skip(self, query))]
    async fn render(&self, query: &str) -> Result<RenderedCapabilities, ProviderError> {
        if self.breaker().state().await == CircuitState::Open {
            return self.render_fallback_or_fail().await;
        }

        match self.call_service(query).await {
            Ok(rendered) => {
                self.breaker().record_success().await;
                Ok(rendered)
            }
            Err(reason) => {
                warn!(error = %reason, "capability service call exhausted retries");
                self.breaker().record_failure().await;
                self.render_fallback_or_fail().await
            }
        }
    }
}

impl ServiceProvider {
    async fn render_fallback_or_fail(&self) -> Result<RenderedCapabilities, ProviderError> {
        match &self.fallback {
            Some(fallback) => fallback.render("").await,
            None => Err(ProviderError::NoFallback),
        }
    }
}

/// Minimum catalog size at which Tiered selection replaces Direct (§4.B
/// Variant 3).
pub const MIN_TOOLS_FOR_TIERING: usize = 20;
/// Tier 1 selection call's output budget.
const TIER1_MAX_TOKENS: u32 = 500;

/// §4.B Variant 3: a Tier 1 LLM call selects relevant `agent/capability`
/// identifiers from summaries only, then Tier 2 renders full schemas for the
/// survivors only.
pub struct TieredProvider<D: AgentDiscovery, F: CapabilityFetcher, C: LlmClient> {
    catalog: Arc<AgentCatalog<D, F>>,
    llm: Arc<C>,
    min_tools: usize,
}

impl<D: AgentDiscovery, F: CapabilityFetcher, C: LlmClient> TieredProvider<D, F, C> {
    pub fn new(catalog: Arc<AgentCatalog<D, F>>, llm: Arc<C>) -> Self {
        Self { catalog, llm, min_tools: MIN_TOOLS_FOR_TIERING }
    }

    pub fn with_min_tools(mut self, min_tools: usize) -> Self {
        self.min_tools = min_tools;
        self
    }

    fn build_selection_prompt(query: &str, summaries: &[(String, String)]) -> String {
        let mut listing = String::new();
        for (id, summary) in summaries {
            listing.push_str(&format!("- {id}: {summary}\n"));
        }
        format!(
            "Available tools (id: summary):\n{listing}\n\
             User request: {query}\n\n\
             Return ONLY a JSON array of the tool ids (in the \"agent/capability\" form above) \
             that are relevant to this request. No prose, no surrounding text. Example: [\"geocode/lookup\"]"
        )
    }

    fn parse_selection(text: &str) -> Vec<String> {
        let trimmed = text.trim();
        let json_part = trimmed
            .find('[')
            .and_then(|start| trimmed.rfind(']').map(|end| &trimmed[start..=end]))
            .unwrap_or(trimmed);
        serde_json::from_str::<Vec<String>>(json_part).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl<D, F, C> CapabilityProvider for TieredProvider<D, F, C>
where
    D: AgentDiscovery + Send + Sync,
    F: CapabilityFetcher + Send + Sync,
    C: LlmClient,
{
    #[instrument(skip(self, query))]
    async fn render(&self, query: &str) -> Result<RenderedCapabilities, ProviderError> {
        let tool_count = self.catalog.tool_count().await;
        if tool_count < self.min_tools {
            let text = self.catalog.format_for_llm().await;
            let agent_names: Vec<String> = self.catalog.agents().await.into_iter().map(|a| a.name).collect();
            return Ok(RenderedCapabilities { text, agent_names });
        }

        let summaries = self.catalog.capability_summaries().await;
        let known: HashSet<&str> = summaries.iter().map(|(id, _)| id.as_str()).collect();
        let prompt = Self::build_selection_prompt(query, &summaries);

        let completion = self
            .llm
            .complete(&prompt, LlmCallOptions { temperature: 0.0, max_tokens: TIER1_MAX_TOKENS, model: None })
            .await
            .map_err(|e| ProviderError::ServiceCallFailed(e.to_string()))?;

        let selected: Vec<String> = Self::parse_selection(&completion.content)
            .into_iter()
            .filter(|id| known.contains(id.as_str()))
            .collect();

        if selected.is_empty() {
            warn!("tier 1 selection yielded zero valid tools, falling back to direct rendering");
            let text = self.catalog.format_for_llm().await;
            let agent_names: Vec<String> = self.catalog.agents().await.into_iter().map(|a| a.name).collect();
            return Ok(RenderedCapabilities { text, agent_names });
        }

        let text = self.catalog.format_tools_for_llm(&selected).await;
        let agent_names: Vec<String> = selected
            .iter()
            .filter_map(|id| id.split('/').next().map(str::to_string))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        Ok(RenderedCapabilities { text, agent_names })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mofa_kernel::orchestration::catalog::{NoopCapabilityFetcher, StaticAgentDiscovery};
    use mofa_kernel::orchestration::traits::LlmCompletion;
    use mofa_kernel::orchestration::types::{Capability, ParameterSpec, ParameterType, RegisteredAgent};

    fn geocode_agent() -> RegisteredAgent {
        let mut agent = RegisteredAgent::new("a1", "geocode", "http://geocode:8080");
        let mut cap = Capability::new("lookup");
        cap.description = "Looks up latitude and longitude for a place name.".into();
        cap.parameters.push(ParameterSpec {
            name: "place".into(),
            type_tag: ParameterType::String,
            required: true,
            description: "place name".into(),
            default: None,
            r#enum: None,
        });
        agent.capabilities.push(cap);
        agent
    }

    #[tokio::test]
    async fn direct_provider_renders_full_catalog() {
        let catalog = Arc::new(AgentCatalog::new(StaticAgentDiscovery::new(vec![geocode_agent()]), NoopCapabilityFetcher));
        catalog.refresh().await.unwrap();
        let provider = DirectProvider::new(catalog);
        let rendered = provider.render("weather in Tokyo").await.unwrap();
        assert!(rendered.text.contains("geocode"));
        assert_eq!(rendered.agent_names, vec!["geocode".to_string()]);
    }

    struct ScriptedLlm {
        response: String,
    }

    #[async_trait::async_trait]
    impl LlmClient for ScriptedLlm {
        async fn complete(&self, _prompt: &str, _options: LlmCallOptions) -> Result<LlmCompletion, mofa_kernel::orchestration::error::PlannerError> {
            Ok(LlmCompletion { content: self.response.clone(), prompt_tokens: 0, completion_tokens: 0 })
        }
    }

    #[tokio::test]
    async fn tiered_provider_below_threshold_behaves_like_direct() {
        let catalog = Arc::new(AgentCatalog::new(StaticAgentDiscovery::new(vec![geocode_agent()]), NoopCapabilityFetcher));
        catalog.refresh().await.unwrap();
        let llm = Arc::new(ScriptedLlm { response: "[]".into() });
        let provider = TieredProvider::new(catalog, llm).with_min_tools(20);
        let rendered = provider.render("weather in Tokyo").await.unwrap();
        assert!(rendered.text.contains("lookup"));
    }

    #[tokio::test]
    async fn tiered_provider_discards_hallucinated_ids_and_keeps_known_ones() {
        let catalog = Arc::new(AgentCatalog::new(StaticAgentDiscovery::new(vec![geocode_agent()]), NoopCapabilityFetcher));
        catalog.refresh().await.unwrap();
        let llm = Arc::new(ScriptedLlm { response: r#"["geocode/lookup", "ghost/vanish"]"#.into() });
        let provider = TieredProvider::new(catalog, llm).with_min_tools(0);
        let rendered = provider.render("weather in Tokyo").await.unwrap();
        assert!(rendered.text.contains("lookup"));
        assert_eq!(rendered.agent_names, vec!["geocode".to_string()]);
    }

    #[tokio::test]
    async fn tiered_provider_falls_back_to_direct_when_nothing_survives() {
        let catalog = Arc::new(AgentCatalog::new(StaticAgentDiscovery::new(vec![geocode_agent()]), NoopCapabilityFetcher));
        catalog.refresh().await.unwrap();
        let llm = Arc::new(ScriptedLlm { response: r#"["ghost/vanish"]"#.into() });
        let provider = TieredProvider::new(catalog, llm).with_min_tools(0);
        let rendered = provider.render("weather in Tokyo").await.unwrap();
        assert!(rendered.text.contains("lookup"));
    }

    #[test]
    fn parse_selection_tolerates_surrounding_prose() {
        let text = "Sure, here are the tools: [\"a/b\", \"c/d\"] -- hope that helps";
        let parsed = TieredProvider::<StaticAgentDiscovery, NoopCapabilityFetcher, ScriptedLlm>::parse_selection(text);
        assert_eq!(parsed, vec!["a/b".to_string(), "c/d".to_string()]);
    }

    #[tokio::test]
    async fn service_provider_without_fallback_fails_when_breaker_open() {
        let provider = ServiceProvider::new("http://127.0.0.1:1", 20, 0.7).with_max_attempts(1);
        for _ in 0..5 {
            provider.built_in_breaker.record_failure().await;
        }
        let err = provider.render("x").await.unwrap_err();
        assert!(matches!(err, ProviderError::NoFallback));
    }

    #[tokio::test]
    async fn service_provider_falls_back_when_breaker_open() {
        let catalog = Arc::new(AgentCatalog::new(StaticAgentDiscovery::new(vec![geocode_agent()]), NoopCapabilityFetcher));
        catalog.refresh().await.unwrap();
        let fallback: Arc<dyn CapabilityProvider> = Arc::new(DirectProvider::new(catalog));
        let provider = ServiceProvider::new("http://127.0.0.1:1", 20, 0.7).with_max_attempts(1).with_fallback(fallback);
        for _ in 0..5 {
            provider.built_in_breaker.record_failure().await;
        }
        let rendered = provider.render("x").await.unwrap();
        assert!(rendered.text.contains("geocode"));
    }
}
