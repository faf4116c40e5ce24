//! Mock provider for testing.

use super::{Completion, FinishReason, GenerationParams, GenerationProvider, ProviderError, TokenBudget};
use crate::services::prompts::PromptExchange;
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
enum MockBehavior {
    /// Wrap the user turn in a `<section>` element.
    Echo,
    Fixed(String),
    Fail(String),
}

/// One call observed by the mock.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub exchange: PromptExchange,
    pub params: GenerationParams,
}

/// In-process provider that never leaves the machine. Records every exchange
/// so tests can assert on the prompts that would have been sent.
pub struct MockGenerationProvider {
    behavior: MockBehavior,
    delay: Option<Duration>,
    budget: TokenBudget,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockGenerationProvider {
    fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            delay: None,
            budget: TokenBudget {
                generate: 2000,
                refine: 2000,
            },
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn echo() -> Self {
        Self::with_behavior(MockBehavior::Echo)
    }

    pub fn fixed(html: impl Into<String>) -> Self {
        Self::with_behavior(MockBehavior::Fixed(html.into()))
    }

    /// Every call fails with an `ApiError` carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behavior(MockBehavior::Fail(message.into()))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_budget(mut self, budget: TokenBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }
}

#[async_trait]
impl GenerationProvider for MockGenerationProvider {
    async fn complete(
        &self,
        exchange: &PromptExchange,
        params: &GenerationParams,
    ) -> Result<Completion, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                exchange: exchange.clone(),
                params: *params,
            });
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let text = match &self.behavior {
            MockBehavior::Echo => format!("<section>{}</section>", exchange.user),
            MockBehavior::Fixed(html) => html.clone(),
            MockBehavior::Fail(message) => return Err(ProviderError::ApiError(message.clone())),
        };

        Ok(Completion {
            input_tokens: (exchange.system.len() + exchange.user.len()) as u32 / 4,
            output_tokens: text.len() as u32 / 4,
            text,
            finish_reason: FinishReason::Complete,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn token_budget(&self) -> TokenBudget {
        self.budget
    }
}
