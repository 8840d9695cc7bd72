//! Adapts this crate's [`crate::llm::provider::LLMProvider`] (OpenAI-compatible,
//! Anthropic, local, etc.) to `mofa-kernel`'s narrower `orchestration::traits::LlmClient`
//! seam, so the planner and tiered capability provider depend on one call shape
//! instead of the full chat/stream/tool-call surface.

use std::sync::Arc;

use mofa_kernel::orchestration::traits::{LlmClient, LlmCallOptions, LlmCompletion};
use mofa_kernel::orchestration::error::PlannerError;

use crate::llm::provider::LLMProvider;
use crate::llm::types::ChatCompletionRequest;

pub struct ProviderLlmClient {
    provider: Arc<dyn LLMProvider>,
    default_model: String,
}

impl ProviderLlmClient {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        let default_model = provider.default_model().to_string();
        Self { provider, default_model }
    }
}

#[async_trait::async_trait]
impl LlmClient for ProviderLlmClient {
    async fn complete(&self, prompt: &str, options: LlmCallOptions) -> Result<LlmCompletion, PlannerError> {
        let model = options.model.unwrap_or_else(|| self.default_model.clone());
        let request = ChatCompletionRequest::new(model)
            .system("Respond with exactly the JSON object requested, no surrounding prose.")
            .user(prompt)
            .temperature(options.temperature)
            .max_tokens(options.max_tokens);

        let response = self
            .provider
            .chat(request)
            .await
            .map_err(|e| PlannerError::LlmCallFailed(e.to_string()))?;

        let content = response
            .content()
            .ok_or_else(|| PlannerError::LlmCallFailed("LLM returned an empty response".to_string()))?
            .to_string();

        Ok(LlmCompletion {
            content,
            prompt_tokens: response.usage.as_ref().map(|u| u.prompt_tokens).unwrap_or(0),
            completion_tokens: response.usage.as_ref().map(|u| u.completion_tokens).unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::{ChatCompletionResponse, ChatMessage, Choice, LLMResult};

    struct StubProvider;

    #[async_trait::async_trait]
    impl LLMProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }
        fn default_model(&self) -> &str {
            "stub-model"
        }
        async fn chat(&self, _request: ChatCompletionRequest) -> LLMResult<ChatCompletionResponse> {
            Ok(ChatCompletionResponse {
                id: "resp-1".to_string(),
                object: "chat.completion".to_string(),
                created: 0,
                model: "stub-model".to_string(),
                choices: vec![Choice {
                    index: 0,
                    message: ChatMessage::assistant(r#"{"ok": true}"#),
                    finish_reason: None,
                    logprobs: None,
                }],
                usage: None,
                system_fingerprint: None,
            })
        }
    }

    #[tokio::test]
    async fn complete_extracts_content_and_falls_back_to_default_model() {
        let client = ProviderLlmClient::new(Arc::new(StubProvider));
        let completion = client.complete("hello", LlmCallOptions::default()).await.unwrap();
        assert_eq!(completion.content, r#"{"ok": true}"#);
    }
}
