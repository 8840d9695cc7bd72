//! HTTP-backed implementations of [`CapabilityFetcher`] and [`AgentClient`]
//! (§4.A Refresh algorithm step 2, §4.D Per-step execution, §6.1 Agent HTTP
//! protocol).
//!
//! Grounded on [`crate::gateway::backend::openai::OpenAiBackend`]'s reqwest
//! `Client::builder().timeout(..).build()` idiom: one shared client, one
//! fixed per-call timeout, errors flattened to a descriptive string rather
//! than propagated as a typed error (the executor owns retry policy, not
//! this transport).

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use mofa_kernel::orchestration::error::{CatalogError, OrchestrationResult};
use mofa_kernel::orchestration::traits::{AgentClient, CapabilityFetcher};
use mofa_kernel::orchestration::types::{Capability, ParameterSpec, RegisteredAgent};

/// §4.A: the capability fetch is bounded to 10s; any failure (timeout,
/// connection refused, non-200, malformed body) falls back to the
/// registration record at the catalog layer.
const CAPABILITY_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Wire shape of one entry in `/api/capabilities`'s JSON array (§6.1). The
/// `returns` field is documented as an object (`{type, description, schema?}`)
/// on the wire but modeled as a single descriptive string in
/// [`mofa_kernel::orchestration::types::Capability`] — [`into_capability`]
/// flattens it at the boundary.
#[derive(Debug, Deserialize)]
struct WireCapability {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    endpoint: Option<String>,
    #[serde(default)]
    parameters: Vec<ParameterSpec>,
    #[serde(default)]
    returns: Option<WireReturns>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    examples: Vec<String>,
    #[serde(default)]
    internal: bool,
    #[serde(default)]
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireReturns {
    #[serde(rename = "type", default)]
    type_name: String,
    #[serde(default)]
    description: String,
}

impl WireReturns {
    fn flatten(self) -> String {
        if !self.description.is_empty() {
            self.description
        } else {
            self.type_name
        }
    }
}

fn into_capability(wire: WireCapability) -> Capability {
    Capability {
        name: wire.name,
        description: wire.description,
        endpoint: wire.endpoint,
        parameters: wire.parameters,
        returns: wire.returns.map(WireReturns::flatten).unwrap_or_default(),
        tags: wire.tags,
        examples: wire.examples,
        summary: wire.summary,
        internal: wire.internal,
    }
}

/// Fetches `GET {agent.address}/api/capabilities` (§6.1). Any non-200 status
/// or body that doesn't parse as the documented JSON array surfaces as
/// [`CatalogError::DiscoveryFailed`], which the catalog's `refresh` treats as
/// "fall back to the registration record" (§4.A step 2).
pub struct ReqwestCapabilityFetcher {
    client: Client,
}

impl Default for ReqwestCapabilityFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ReqwestCapabilityFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .timeout(CAPABILITY_FETCH_TIMEOUT)
                .build()
                .expect("failed to build reqwest client"),
        }
    }
}

#[async_trait::async_trait]
impl CapabilityFetcher for ReqwestCapabilityFetcher {
    #[instrument(skip(self, agent), fields(agent_id = %agent.agent_id))]
    async fn fetch_capabilities(&self, agent: &RegisteredAgent) -> OrchestrationResult<Vec<Capability>> {
        let url = format!("{}/api/capabilities", agent.address.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CatalogError::DiscoveryFailed(format!("GET {url} failed: {e}")))?;

        if !response.status().is_success() {
            return Err(CatalogError::DiscoveryFailed(format!(
                "GET {url} returned status {}",
                response.status()
            ))
            .into());
        }

        let wire: Vec<WireCapability> = response
            .json()
            .await
            .map_err(|e| CatalogError::DiscoveryFailed(format!("GET {url} returned an undecodable body: {e}")))?;

        Ok(wire.into_iter().map(into_capability).collect())
    }
}

/// POSTs a step's resolved parameters to `http://<address><endpoint>` (§4.D
/// Per-step execution step 3). One attempt per call; the DAG executor owns
/// retry/backoff.
pub struct ReqwestAgentClient {
    client: Client,
}

impl Default for ReqwestAgentClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ReqwestAgentClient {
    pub fn new() -> Self {
        Self {
            client: Client::builder().build().expect("failed to build reqwest client"),
        }
    }
}

#[async_trait::async_trait]
impl AgentClient for ReqwestAgentClient {
    #[instrument(skip(self, parameters), fields(address = %address, endpoint = %endpoint))]
    async fn invoke(&self, address: &str, endpoint: &str, parameters: &HashMap<String, Value>) -> Result<Value, String> {
        let base = address.trim_end_matches('/');
        let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("{base}{endpoint}")
        };

        let response = self
            .client
            .post(&url)
            .json(parameters)
            .send()
            .await
            .map_err(|e| format!("POST {url} failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("POST {url} returned HTTP {status}: {body}"));
        }

        response.json::<Value>().await.map_err(|e| format!("POST {url} returned an undecodable body: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_returns_prefers_description_over_type() {
        let with_desc = WireReturns { type_name: "object".into(), description: "a forecast".into() };
        assert_eq!(with_desc.flatten(), "a forecast");
        let bare = WireReturns { type_name: "object".into(), description: String::new() };
        assert_eq!(bare.flatten(), "object");
    }

    #[test]
    fn into_capability_flattens_wire_shape() {
        let wire = WireCapability {
            name: "lookup".into(),
            description: "Looks up a place.".into(),
            endpoint: Some("/api/lookup".into()),
            parameters: Vec::new(),
            returns: Some(WireReturns { type_name: "object".into(), description: "lat/lon pair".into() }),
            tags: vec!["geo".into()],
            examples: Vec::new(),
            internal: false,
            summary: None,
        };
        let cap = into_capability(wire);
        assert_eq!(cap.returns, "lat/lon pair");
        assert_eq!(cap.tags, vec!["geo".to_string()]);
    }
}
