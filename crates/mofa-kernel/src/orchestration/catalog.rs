//! AgentCatalog (§4.A): a thread-safe, periodically refreshed index of
//! registered remote agents and their capability schemas.
//!
//! Grounded on [`crate::gateway::capability::CapabilityRegistry`] /
//! `mofa-gateway`'s `InMemoryCapabilityRegistry` (HashMap-backed,
//! validate-on-register), upgraded from a plain `&mut self` registry to an
//! async `RwLock`-guarded catalog since `refresh` is I/O-bound and must run
//! concurrently with reads (§4.A Concurrency).

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{instrument, warn};

use super::error::{CatalogError, OrchestrationResult};
use super::traits::{AgentDiscovery, CapabilityFetcher};
use super::types::{derive_summary, Capability, RegisteredAgent};

/// Compound identifier `"<agent_name>/<capability_name>"` used by tiered
/// selection (§4.B Variant 3) to name an individual tool.
pub fn tool_id(agent_name: &str, capability_name: &str) -> String {
    format!("{agent_name}/{capability_name}")
}

#[derive(Default)]
struct CatalogInner {
    agents: HashMap<String, RegisteredAgent>,
    /// capability name -> agent ids exposing it.
    capability_index: HashMap<String, Vec<String>>,
}

/// Thread-safe catalog of registered agents, generic over the discovery and
/// per-agent capability-fetch collaborators so it can be exercised in tests
/// without a network.
pub struct AgentCatalog<D: AgentDiscovery, F: CapabilityFetcher> {
    discovery: D,
    fetcher: F,
    inner: Arc<RwLock<CatalogInner>>,
}

impl<D: AgentDiscovery, F: CapabilityFetcher> AgentCatalog<D, F> {
    pub fn new(discovery: D, fetcher: F) -> Self {
        Self {
            discovery,
            fetcher,
            inner: Arc::new(RwLock::new(CatalogInner::default())),
        }
    }

    /// §4.A Refresh algorithm.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> OrchestrationResult<()> {
        let registered = self.discovery.list_agents().await?;

        let mut refreshed = Vec::with_capacity(registered.len());
        for mut agent in registered {
            match self.fetcher.fetch_capabilities(&agent).await {
                Ok(fetched) => {
                    agent.capabilities = enrich_fetched(fetched, &agent.capabilities);
                }
                Err(err) => {
                    // Fall back to the registration record's own capability data.
                    warn!(agent_id = %agent.agent_id, error = %err, "capability fetch failed, using registration record");
                }
            }
            refreshed.push(agent);
        }

        let mut capability_index: HashMap<String, Vec<String>> = HashMap::new();
        for agent in &refreshed {
            for cap in agent.public_capabilities() {
                capability_index
                    .entry(cap.name.clone())
                    .or_default()
                    .push(agent.agent_id.clone());
            }
        }

        let mut agents = HashMap::with_capacity(refreshed.len());
        for agent in refreshed {
            agents.insert(agent.agent_id.clone(), agent);
        }

        let mut guard = self.inner.write().await;
        guard.agents = agents;
        guard.capability_index = capability_index;
        Ok(())
    }

    /// Defensive-copy snapshot of every registered agent.
    pub async fn agents(&self) -> Vec<RegisteredAgent> {
        self.inner.read().await.agents.values().cloned().collect()
    }

    pub async fn known_agent_names(&self) -> std::collections::HashSet<String> {
        self.inner.read().await.agents.values().map(|a| a.name.clone()).collect()
    }

    pub async fn find_by_capability(&self, capability_name: &str) -> Vec<String> {
        self.inner
            .read()
            .await
            .capability_index
            .get(capability_name)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn get_agent_by_name(&self, name: &str) -> Option<RegisteredAgent> {
        self.inner
            .read()
            .await
            .agents
            .values()
            .find(|a| a.name == name)
            .cloned()
    }

    pub async fn tool_count(&self) -> usize {
        self.inner
            .read()
            .await
            .agents
            .values()
            .map(|a| a.public_capabilities().count())
            .sum()
    }

    pub async fn capability_summaries(&self) -> Vec<(String, String)> {
        self.inner
            .read()
            .await
            .agents
            .values()
            .flat_map(|a| {
                a.public_capabilities()
                    .map(|c| (tool_id(&a.name, &c.name), c.summary_or_derive()))
            })
            .collect()
    }

    /// §4.A `FormatForLLM` contract: agents with zero public capabilities are
    /// omitted entirely (prevents orchestrator-to-itself recursion).
    pub async fn format_for_llm(&self) -> String {
        let guard = self.inner.read().await;
        let mut agents: Vec<&RegisteredAgent> = guard.agents.values().collect();
        agents.sort_by(|a, b| a.name.cmp(&b.name));
        format_agents(agents.into_iter().filter(|a| a.public_capabilities().next().is_some()))
    }

    /// §4.A `FormatToolsForLLM(subset)`: identical format, filtered by a
    /// `(agent, capability)` allow-list of tool ids.
    pub async fn format_tools_for_llm(&self, tool_ids: &[String]) -> String {
        let allow: std::collections::HashSet<&str> = tool_ids.iter().map(|s| s.as_str()).collect();
        let guard = self.inner.read().await;
        let mut agents: Vec<RegisteredAgent> = guard
            .agents
            .values()
            .map(|a| {
                let mut a = a.clone();
                a.capabilities
                    .retain(|c| !c.internal && allow.contains(tool_id(&a.name, &c.name).as_str()));
                a
            })
            .filter(|a| !a.capabilities.is_empty())
            .collect();
        agents.sort_by(|a, b| a.name.cmp(&b.name));
        format_agents(agents.iter())
    }
}

fn format_agents<'a>(agents: impl Iterator<Item = &'a RegisteredAgent>) -> String {
    let mut out = String::new();
    for agent in agents {
        out.push_str(&format!("Agent: {} ({})\n", agent.name, agent.address));
        let mut caps: Vec<&Capability> = agent.public_capabilities().collect();
        caps.sort_by(|a, b| a.name.cmp(&b.name));
        for cap in caps {
            out.push_str(&format!("  - {}: {}\n", cap.name, cap.description));
            for param in &cap.parameters {
                let marker = if param.required { "required" } else { "optional" };
                out.push_str(&format!(
                    "      {} ({:?}, {}): {}\n",
                    param.name, param.type_tag, marker, param.description
                ));
            }
            if !cap.returns.is_empty() {
                out.push_str(&format!("      returns: {}\n", cap.returns));
            }
        }
    }
    out
}

/// Enriches a freshly-fetched capability list with registration-provided
/// fields when the fetch omitted parameter detail (§4.A Refresh step 3):
/// required parameters are merged first, then optional ones; the `internal`
/// flag is always propagated from the registration record.
fn enrich_fetched(fetched: Vec<Capability>, registered: &[Capability]) -> Vec<Capability> {
    let registered_by_name: HashMap<&str, &Capability> =
        registered.iter().map(|c| (c.name.as_str(), c)).collect();

    fetched
        .into_iter()
        .map(|mut cap| {
            let Some(reg) = registered_by_name.get(cap.name.as_str()) else {
                return cap;
            };
            cap.internal = reg.internal;
            if cap.parameters.is_empty() && !reg.parameters.is_empty() {
                let mut required: Vec<_> = reg.parameters.iter().filter(|p| p.required).cloned().collect();
                let mut optional: Vec<_> = reg.parameters.iter().filter(|p| !p.required).cloned().collect();
                required.append(&mut optional);
                cap.parameters = required;
            }
            if cap.summary.is_none() {
                cap.summary = reg.summary.clone().or_else(|| Some(derive_summary(&reg.description)));
            }
            cap
        })
        .collect()
}

/// Static test/demo discovery source — intentionally the *only* `AgentDiscovery`
/// implementation in this crate, in place of the legacy hardcoded-service-list
/// pattern flagged in spec §9 as a bug to omit.
pub struct StaticAgentDiscovery {
    agents: Vec<RegisteredAgent>,
}

impl StaticAgentDiscovery {
    pub fn new(agents: Vec<RegisteredAgent>) -> Self {
        Self { agents }
    }
}

#[async_trait::async_trait]
impl AgentDiscovery for StaticAgentDiscovery {
    async fn list_agents(&self) -> OrchestrationResult<Vec<RegisteredAgent>> {
        Ok(self.agents.clone())
    }
}

/// Fetcher that always falls back to the registration record, for tests that
/// do not need to exercise the HTTP path.
pub struct NoopCapabilityFetcher;

#[async_trait::async_trait]
impl CapabilityFetcher for NoopCapabilityFetcher {
    async fn fetch_capabilities(&self, agent: &RegisteredAgent) -> OrchestrationResult<Vec<Capability>> {
        Err(CatalogError::DiscoveryFailed(format!(
            "no network fetcher configured for {}",
            agent.agent_id
        ))
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestration::types::ParameterSpec;
    use crate::orchestration::types::ParameterType;

    fn agent_with_caps() -> RegisteredAgent {
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
        let mut internal_cap = Capability::new("internal_reset");
        internal_cap.internal = true;
        agent.capabilities.push(internal_cap);
        agent
    }

    #[tokio::test]
    async fn refresh_builds_capability_index_and_omits_agents_without_public_capabilities() {
        let internal_only = {
            let mut a = RegisteredAgent::new("a2", "self", "http://self:9090");
            let mut cap = Capability::new("recurse");
            cap.internal = true;
            a.capabilities.push(cap);
            a
        };
        let discovery = StaticAgentDiscovery::new(vec![agent_with_caps(), internal_only]);
        let catalog = AgentCatalog::new(discovery, NoopCapabilityFetcher);
        catalog.refresh().await.unwrap();

        assert_eq!(catalog.find_by_capability("lookup").await, vec!["a1".to_string()]);
        assert_eq!(catalog.tool_count().await, 1);

        let text = catalog.format_for_llm().await;
        assert!(text.contains("geocode"));
        assert!(!text.contains("self"));
        assert!(!text.contains("internal_reset"));
    }

    #[tokio::test]
    async fn refresh_is_idempotent_with_no_upstream_changes() {
        let discovery = StaticAgentDiscovery::new(vec![agent_with_caps()]);
        let catalog = AgentCatalog::new(discovery, NoopCapabilityFetcher);
        catalog.refresh().await.unwrap();
        let before = catalog.format_for_llm().await;
        catalog.refresh().await.unwrap();
        let after = catalog.format_for_llm().await;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn format_tools_for_llm_filters_by_allow_list() {
        let discovery = StaticAgentDiscovery::new(vec![agent_with_caps()]);
        let catalog = AgentCatalog::new(discovery, NoopCapabilityFetcher);
        catalog.refresh().await.unwrap();

        let rendered = catalog.format_tools_for_llm(&[tool_id("geocode", "lookup")]).await;
        assert!(rendered.contains("lookup"));

        let empty = catalog.format_tools_for_llm(&[]).await;
        assert!(empty.is_empty());
    }

    #[test]
    fn enrich_fetched_merges_required_before_optional() {
        let registered = vec![{
            let mut c = Capability::new("lookup");
            c.parameters.push(ParameterSpec {
                name: "optional_a".into(),
                type_tag: ParameterType::String,
                required: false,
                description: String::new(),
                default: None,
                r#enum: None,
            });
            c.parameters.push(ParameterSpec {
                name: "required_b".into(),
                type_tag: ParameterType::String,
                required: true,
                description: String::new(),
                default: None,
                r#enum: None,
            });
            c
        }];
        let fetched = vec![Capability::new("lookup")];
        let merged = enrich_fetched(fetched, &registered);
        let names: Vec<&str> = merged[0].parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["required_b", "optional_a"]);
    }
}
