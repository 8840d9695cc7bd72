//! LLM-backed Planner (§4.C): turns a natural-language request plus rendered
//! capability text into a validated `RoutingPlan`.
//!
//! Directly adapted from [`crate::llm::llm_planner::LLMPlanner`]'s
//! `extract_json`/JSON-parse-into-typed-struct idiom, retargeted from the
//! `Plan`/`PlanStep` shape to `RoutingPlan`/`RoutingStep`, and extended with
//! the diagnostic-appendix retry loop (§4.C Retry semantics) that
//! `LLMPlanner::decompose` does not need since it has no catalog to validate
//! hallucinated tool names against.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value;

use mofa_kernel::orchestration::error::PlannerError;
use mofa_kernel::orchestration::traits::{LlmCallOptions, LlmClient, Planner};
use mofa_kernel::orchestration::types::{RoutingPlan, RoutingStep, StepMetadata};

/// Default two-attempt retry on extraction/validation failure (§4.C Retry semantics).
const DEFAULT_MAX_ATTEMPTS: u32 = 2;

pub struct LlmPlanner<C: LlmClient> {
    client: Arc<C>,
    max_attempts: u32,
    temperature: f32,
}

impl<C: LlmClient> LlmPlanner<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            temperature: 0.0,
        }
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    fn build_prompt(request: &str, capability_text: &str, diagnostic: Option<&str>) -> String {
        let mut prompt = format!(
            "Capabilities available:\n{capability_text}\n\n\
             User request: {request}\n\n\
             Produce a JSON object with this exact shape:\n\
             {{\n  \"plan_id\": \"...\",\n  \"original_request\": \"...\",\n  \"steps\": [\n    {{\n      \
             \"step_id\": \"s1\",\n      \"agent_name\": \"...\",\n      \"metadata\": {{\"capability\": \"...\", \"parameters\": {{}}}},\n      \
             \"depends_on\": []\n    }}\n  ]\n}}\n\n\
             Rules:\n\
             - Every agent_name must be one of the agents listed above.\n\
             - Numbers must be JSON numbers, booleans must be JSON booleans — never quoted strings.\n\
             - depends_on must only reference step_ids declared in this same plan.\n\
             - Order steps so dependencies precede dependents.\n\
             - Return ONLY the JSON object, no surrounding prose."
        );
        if let Some(diag) = diagnostic {
            prompt.push_str(&format!("\n\nThe previous attempt failed: {diag}\nFix this and try again."));
        }
        prompt
    }

    /// Strip markdown code fences the way `LLMPlanner::extract_json` does.
    fn extract_json(text: &str) -> &str {
        let trimmed = text.trim();
        if let Some(start) = trimmed.find("```json") {
            let after = &trimmed[start + 7..];
            if let Some(end) = after.find("```") {
                return after[..end].trim();
            }
        }
        if let Some(start) = trimmed.find("```") {
            let after = &trimmed[start + 3..];
            if let Some(end) = after.find("```") {
                return after[..end].trim();
            }
        }
        trimmed
    }

    fn parse_plan(json_str: &str) -> Result<RoutingPlan, String> {
        let raw: Value = serde_json::from_str(json_str).map_err(|e| format!("invalid JSON: {e}"))?;

        let plan_id = raw["plan_id"].as_str().ok_or("missing 'plan_id'")?.to_string();
        let original_request = raw["original_request"].as_str().unwrap_or_default().to_string();
        let steps_val = raw["steps"].as_array().ok_or("missing or non-array 'steps'")?;
        if steps_val.is_empty() {
            return Err("'steps' must be non-empty".to_string());
        }

        let mut plan = RoutingPlan::new(plan_id, original_request);
        for step_val in steps_val {
            let step_id = step_val["step_id"].as_str().ok_or("step missing 'step_id'")?.to_string();
            let agent_name = step_val["agent_name"].as_str().ok_or("step missing 'agent_name'")?.to_string();
            let capability = step_val["metadata"]["capability"]
                .as_str()
                .ok_or("step missing 'metadata.capability'")?
                .to_string();

            let parameters: HashMap<String, Value> = step_val["metadata"]["parameters"]
                .as_object()
                .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                .unwrap_or_default();

            let depends_on: Vec<String> = step_val["depends_on"]
                .as_array()
                .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
                .unwrap_or_default();

            let mut step = RoutingStep::new(step_id, agent_name, capability);
            step.metadata = StepMetadata { capability: step.metadata.capability, parameters };
            step.depends_on = depends_on;
            plan = plan.add_step(step);
        }

        Ok(plan)
    }
}

#[async_trait::async_trait]
impl<C: LlmClient> Planner for LlmPlanner<C> {
    async fn plan(&self, request: &str, capability_text: &str, known_agents: &[String]) -> mofa_kernel::orchestration::error::OrchestrationResult<RoutingPlan> {
        let known: HashSet<String> = known_agents.iter().cloned().collect();
        let mut diagnostic: Option<String> = None;

        for attempt in 1..=self.max_attempts {
            let prompt = Self::build_prompt(request, capability_text, diagnostic.as_deref());
            let completion = self
                .client
                .complete(&prompt, LlmCallOptions { temperature: self.temperature, ..Default::default() })
                .await
                .map_err(mofa_kernel::orchestration::error::OrchestrationError::Planner)?;

            let json_str = Self::extract_json(&completion.content);
            let plan = match Self::parse_plan(json_str) {
                Ok(plan) => plan,
                Err(reason) => {
                    diagnostic = Some(reason);
                    continue;
                }
            };

            if let Err(err) = plan.validate() {
                diagnostic = Some(err.to_string());
                continue;
            }

            let hallucinated = plan.hallucinated_steps(&known);
            if !hallucinated.is_empty() {
                diagnostic = Some(format!("unknown agent(s) referenced by step(s): {}", hallucinated.join(", ")));
                continue;
            }

            return Ok(plan);
        }

        Err(PlannerError::RetriesExhausted { attempts: self.max_attempts }.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mofa_kernel::orchestration::traits::LlmCompletion;

    struct ScriptedClient {
        responses: std::sync::Mutex<Vec<&'static str>>,
    }

    #[async_trait::async_trait]
    impl LlmClient for ScriptedClient {
        async fn complete(&self, _prompt: &str, _options: LlmCallOptions) -> Result<LlmCompletion, PlannerError> {
            let mut responses = self.responses.lock().unwrap();
            let content = responses.remove(0);
            Ok(LlmCompletion { content: content.to_string(), prompt_tokens: 0, completion_tokens: 0 })
        }
    }

    fn client(responses: Vec<&'static str>) -> Arc<ScriptedClient> {
        Arc::new(ScriptedClient { responses: std::sync::Mutex::new(responses) })
    }

    #[tokio::test]
    async fn valid_plan_on_first_attempt_is_accepted() {
        let response = r#"```json
        {"plan_id":"p1","original_request":"weather","steps":[
          {"step_id":"s1","agent_name":"geocode","metadata":{"capability":"lookup","parameters":{}},"depends_on":[]}
        ]}
        ```"#;
        let planner = LlmPlanner::new(client(vec![response]));
        let known = vec!["geocode".to_string()];
        let plan = planner.plan("weather in Tokyo", "Agent: geocode", &known).await.unwrap();
        assert_eq!(plan.steps.len(), 1);
    }

    #[tokio::test]
    async fn hallucinated_agent_triggers_retry_then_fails() {
        let bad = r#"{"plan_id":"p1","original_request":"r","steps":[{"step_id":"s1","agent_name":"ghost","metadata":{"capability":"c","parameters":{}},"depends_on":[]}]}"#;
        let planner = LlmPlanner::new(client(vec![bad, bad]));
        let err = planner.plan("r", "Agent: geocode", &["geocode".to_string()]).await.unwrap_err();
        assert!(err.to_string().contains("exhausted"));
    }

    #[tokio::test]
    async fn malformed_json_retries_then_succeeds() {
        let planner = LlmPlanner::new(client(vec![
            "not json at all",
            r#"{"plan_id":"p1","original_request":"r","steps":[{"step_id":"s1","agent_name":"geocode","metadata":{"capability":"lookup","parameters":{}},"depends_on":[]}]}"#,
        ]));
        let plan = planner.plan("r", "Agent: geocode", &["geocode".to_string()]).await.unwrap();
        assert_eq!(plan.plan_id, "p1");
    }

    #[test]
    fn extract_json_strips_fences() {
        assert_eq!(LlmPlanner::<ScriptedClient>::extract_json("```json\n{}\n```"), "{}");
        assert_eq!(LlmPlanner::<ScriptedClient>::extract_json("{}"), "{}");
    }
}
