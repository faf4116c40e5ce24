//! OpenAI provider implementation.
//!
//! Uses the Chat Completions API with a system message and a single user
//! message.

use super::{Completion, FinishReason, GenerationParams, GenerationProvider, ProviderError, TokenBudget};
use crate::services::prompts::PromptExchange;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const PROVIDER_LABEL: &str = "OpenAI";

/// OpenAI provider configuration.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Secret<String>,
    pub model: String,
    /// API root, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    pub timeout: Duration,
    pub budget: TokenBudget,
}

/// OpenAI chat-completions provider.
pub struct OpenAiProvider {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig) -> Result<Self, ProviderError> {
        if config.api_key.expose_secret().is_empty() {
            return Err(ProviderError::NotConfigured(
                "OpenAI API key not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ProviderError::NotConfigured(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    fn api_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl GenerationProvider for OpenAiProvider {
    async fn complete(
        &self,
        exchange: &PromptExchange,
        params: &GenerationParams,
    ) -> Result<Completion, ProviderError> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &exchange.system,
                },
                ChatMessage {
                    role: "user",
                    content: &exchange.user,
                },
            ],
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        };

        let response = self
            .client
            .post(self.api_url())
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(PROVIDER_LABEL, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(PROVIDER_LABEL, status, &error_text));
        }

        let api_response: ChatCompletionResponse = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse OpenAI response: {}", e))
        })?;

        let choice = api_response.choices.into_iter().next().ok_or_else(|| {
            ProviderError::InvalidResponse("OpenAI response contained no choices".to_string())
        })?;

        let text = choice.message.content.ok_or_else(|| {
            ProviderError::InvalidResponse("OpenAI response contained no completion".to_string())
        })?;

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("stop") | None => FinishReason::Complete,
            Some("length") => FinishReason::Length,
            Some("content_filter") => FinishReason::ContentFilter,
            Some(_) => FinishReason::Other,
        };

        let usage = api_response.usage.unwrap_or_default();

        Ok(Completion {
            text,
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
            finish_reason,
        })
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn token_budget(&self) -> TokenBudget {
        self.config.budget
    }
}

// ============================================================================
// OpenAI API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::prompts;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> OpenAiProvider {
        OpenAiProvider::new(OpenAiConfig {
            api_key: Secret::new("sk-test".to_string()),
            model: "gpt-4".to_string(),
            base_url: format!("{}/v1", server.uri()),
            timeout: Duration::from_secs(5),
            budget: TokenBudget {
                generate: 2000,
                refine: 2000,
            },
        })
        .expect("provider")
    }

    fn completion_body(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 120, "completion_tokens": 45, "total_tokens": 165}
        })
    }

    #[tokio::test]
    async fn generate_sends_system_and_user_turns() {
        let server = MockServer::start().await;
        let system = prompts::generation_system_prompt(None, None);

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4",
                "max_tokens": 2000,
                "temperature": 0.7,
                "messages": [
                    {"role": "system", "content": system},
                    {"role": "user", "content": "A hero section for a bakery"}
                ]
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion_body("<section>Bread</section>")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let html = provider(&server)
            .generate("A hero section for a bakery", None, None)
            .await
            .expect("generate");

        assert_eq!(html, "<section>Bread</section>");
    }

    #[tokio::test]
    async fn refine_uses_refinement_instruction() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({
                "messages": [
                    {"role": "system", "content": prompts::REFINEMENT_SYSTEM_PROMPT},
                    {"role": "user", "content": "Current HTML:\n<p>Old</p>\n\nPlease modify it to: make it bold"}
                ]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion_body("<p><strong>Old</strong></p>")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let html = provider(&server)
            .refine("<p>Old</p>", "make it bold")
            .await
            .expect("refine");

        assert_eq!(html, "<p><strong>Old</strong></p>");
    }

    #[tokio::test]
    async fn unauthorized_maps_to_authentication_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let err = provider(&server)
            .generate("anything", None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Authentication(ref m) if m.contains("Incorrect API key")));
    }

    #[tokio::test]
    async fn server_error_carries_status_and_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": {"message": "The server had an error while processing your request", "type": "server_error"}
            })))
            .mount(&server)
            .await;

        let err = provider(&server)
            .generate("anything", None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::ApiError(_)));
        let message = err.to_string();
        assert!(message.contains("500"), "{}", message);
        assert!(message.contains("had an error while processing"), "{}", message);
    }

    #[tokio::test]
    async fn missing_choices_is_invalid_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = provider(&server)
            .generate("anything", None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn non_json_body_is_invalid_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .refine("<p>x</p>", "y")
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn slow_provider_hits_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion_body("<p>late</p>"))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new(OpenAiConfig {
            api_key: Secret::new("sk-test".to_string()),
            model: "gpt-4".to_string(),
            base_url: server.uri(),
            timeout: Duration::from_millis(200),
            budget: TokenBudget {
                generate: 10,
                refine: 10,
            },
        })
        .expect("provider");

        let err = provider.generate("x", None, None).await.unwrap_err();
        assert!(matches!(err, ProviderError::NetworkError(ref m) if m.contains("timed out")));
    }

    #[test]
    fn empty_api_key_is_not_configured() {
        let result = OpenAiProvider::new(OpenAiConfig {
            api_key: Secret::new(String::new()),
            model: "gpt-4".to_string(),
            base_url: "http://localhost".to_string(),
            timeout: Duration::from_secs(1),
            budget: TokenBudget {
                generate: 1,
                refine: 1,
            },
        });
        assert!(matches!(result, Err(ProviderError::NotConfigured(_))));
    }
}
