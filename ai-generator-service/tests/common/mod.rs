//! Shared helpers for ai-generator-service integration tests.

#![allow(dead_code)]

use ai_generator_service::config::{GeneratorConfig, ProviderKind, ProviderSettings};
use ai_generator_service::services::providers::MockGenerationProvider;
use ai_generator_service::services::GenerationProvider;
use ai_generator_service::startup::Application;
use reqwest::Client;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use std::time::Duration;

/// Running application bound to a random local port.
pub struct TestApp {
    pub address: String,
    pub port: u16,
    client: Client,
}

fn test_core_config() -> CoreConfig {
    CoreConfig {
        port: 0,
        ..CoreConfig::default()
    }
}

impl TestApp {
    /// Spawn the application around `provider`.
    pub async fn spawn_with_provider(provider: Arc<dyn GenerationProvider>) -> Self {
        let app = Application::build_with_provider(&test_core_config(), provider)
            .await
            .expect("Failed to build application");
        Self::start(app).await
    }

    /// Spawn the application with a real provider built from `settings`.
    pub async fn spawn_with_settings(settings: ProviderSettings) -> Self {
        let config = GeneratorConfig {
            common: test_core_config(),
            provider: settings,
        };
        let app = Application::build(config)
            .await
            .expect("Failed to build application");
        Self::start(app).await
    }

    /// Spawn an OpenAI-backed application whose API root is `base_url`.
    pub async fn spawn_openai(base_url: &str, api_key: &str) -> Self {
        let mut settings = ProviderSettings::with_defaults(ProviderKind::OpenAi, api_key);
        settings.base_url = base_url.to_string();
        settings.timeout_secs = 5;
        Self::spawn_with_settings(settings).await
    }

    pub async fn spawn_anthropic(base_url: &str, api_key: &str) -> Self {
        let mut settings = ProviderSettings::with_defaults(ProviderKind::Anthropic, api_key);
        settings.base_url = base_url.to_string();
        settings.timeout_secs = 5;
        Self::spawn_with_settings(settings).await
    }

    pub async fn spawn_echo() -> (Self, Arc<MockGenerationProvider>) {
        let provider = Arc::new(MockGenerationProvider::echo());
        let app = Self::spawn_with_provider(provider.clone()).await;
        (app, provider)
    }

    async fn start(app: Application) -> Self {
        let port = app.port();

        tokio::spawn(async move {
            let _ = app.run_until_stopped().await;
        });

        // Wait for server to start
        tokio::time::sleep(Duration::from_millis(50)).await;

        TestApp {
            address: format!("http://127.0.0.1:{}", port),
            port,
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to build client"),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_raw(&self, path: &str, body: &'static str) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request")
    }
}
