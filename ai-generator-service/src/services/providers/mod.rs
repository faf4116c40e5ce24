//! AI provider abstractions and implementations.
//!
//! Each backend implements [`GenerationProvider::complete`]; the generate and
//! refine operations are built on top of it so every provider shares the same
//! prompt templates. Which backend runs is decided once at startup.

pub mod anthropic;
pub mod mock;
pub mod openai;

use crate::config::{ProviderKind, ProviderSettings};
use crate::services::metrics;
use crate::services::prompts::{self, PromptExchange};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

pub use anthropic::AnthropicProvider;
pub use mock::MockGenerationProvider;
pub use openai::OpenAiProvider;

/// Sampling temperature used for both generate and refine.
pub const TEMPERATURE: f32 = 0.7;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::Authentication(_) => "authentication",
            ProviderError::RateLimited(_) => "rate_limited",
            ProviderError::ApiError(_) => "api",
            ProviderError::NetworkError(_) => "network",
            ProviderError::InvalidResponse(_) => "invalid_response",
        }
    }

    pub(crate) fn from_transport(provider: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::NetworkError(format!("{} request timed out", provider))
        } else {
            ProviderError::NetworkError(format!("{} request failed: {}", provider, err))
        }
    }

    /// Map a non-success HTTP status and its body to an error, preferring the
    /// provider's own `error.message` when the body carries one.
    pub(crate) fn from_status(provider: &str, status: reqwest::StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .map(|b| b.error.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| body.trim().to_string());

        match status.as_u16() {
            401 | 403 => ProviderError::Authentication(format!("{} API: {}", provider, message)),
            429 => ProviderError::RateLimited(format!("{} API: {}", provider, message)),
            _ => ProviderError::ApiError(format!(
                "{} API error {}: {}",
                provider, status, message
            )),
        }
    }
}

/// Error body shape shared by the OpenAI and Anthropic APIs.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

/// Reason why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Complete,
    Length,
    ContentFilter,
    Other,
}

/// Text returned by a provider for one exchange.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub finish_reason: FinishReason,
}

/// Generation parameters for a single provider call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GenerationParams {
    pub fn with_max_tokens(max_tokens: u32) -> Self {
        Self {
            max_tokens,
            temperature: TEMPERATURE,
        }
    }
}

/// Output budgets for the two operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBudget {
    pub generate: u32,
    pub refine: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Generate,
    Refine,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Generate => "generate",
            Operation::Refine => "refine",
        }
    }
}

/// A generative-model backend able to produce HTML from prompts.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Send one system + user exchange and return the first completion.
    async fn complete(
        &self,
        exchange: &PromptExchange,
        params: &GenerationParams,
    ) -> Result<Completion, ProviderError>;

    /// Provider label, e.g. "openai".
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    fn token_budget(&self) -> TokenBudget;

    /// Generate an HTML fragment for `prompt`.
    async fn generate(
        &self,
        prompt: &str,
        brand_context: Option<&str>,
        constraints: Option<&str>,
    ) -> Result<String, ProviderError> {
        let exchange = prompts::generation_exchange(prompt, brand_context, constraints);
        let params = GenerationParams::with_max_tokens(self.token_budget().generate);
        run_operation(self, Operation::Generate, &exchange, &params).await
    }

    /// Rewrite `current_html` according to `refinement_request`.
    async fn refine(
        &self,
        current_html: &str,
        refinement_request: &str,
    ) -> Result<String, ProviderError> {
        let exchange = prompts::refinement_exchange(current_html, refinement_request);
        let params = GenerationParams::with_max_tokens(self.token_budget().refine);
        run_operation(self, Operation::Refine, &exchange, &params).await
    }
}

async fn run_operation<P>(
    provider: &P,
    operation: Operation,
    exchange: &PromptExchange,
    params: &GenerationParams,
) -> Result<String, ProviderError>
where
    P: GenerationProvider + ?Sized,
{
    tracing::debug!(
        provider = provider.name(),
        model = provider.model(),
        operation = operation.as_str(),
        system_len = exchange.system.len(),
        user_len = exchange.user.len(),
        max_tokens = params.max_tokens,
        "Sending request to provider"
    );

    let start = Instant::now();
    let result = provider.complete(exchange, params).await.and_then(|completion| {
        if completion.text.trim().is_empty() {
            Err(ProviderError::InvalidResponse(
                "Provider response contained no completion".to_string(),
            ))
        } else {
            Ok(completion)
        }
    });
    let elapsed = start.elapsed();

    metrics::record_provider_call(provider.name(), operation, &result, elapsed);

    match result {
        Ok(completion) => {
            if completion.finish_reason == FinishReason::Length {
                tracing::warn!(
                    provider = provider.name(),
                    operation = operation.as_str(),
                    max_tokens = params.max_tokens,
                    "Completion truncated at the output token limit"
                );
            }
            tracing::info!(
                provider = provider.name(),
                operation = operation.as_str(),
                input_tokens = completion.input_tokens,
                output_tokens = completion.output_tokens,
                latency_ms = elapsed.as_millis() as u64,
                "Provider call completed"
            );
            Ok(completion.text)
        }
        Err(e) => Err(e),
    }
}

/// Construct the provider selected in `settings`.
pub fn build_provider(
    settings: &ProviderSettings,
) -> Result<Arc<dyn GenerationProvider>, ProviderError> {
    let timeout = Duration::from_secs(settings.timeout_secs);
    let budget = TokenBudget {
        generate: settings.generate_max_tokens,
        refine: settings.refine_max_tokens,
    };

    let provider: Arc<dyn GenerationProvider> = match settings.kind {
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(openai::OpenAiConfig {
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            base_url: settings.base_url.clone(),
            timeout,
            budget,
        })?),
        ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(anthropic::AnthropicConfig {
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            base_url: settings.base_url.clone(),
            timeout,
            budget,
        })?),
    };

    Ok(provider)
}
