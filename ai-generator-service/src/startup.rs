//! Application startup and lifecycle management.

use crate::config::GeneratorConfig;
use crate::handlers;
use crate::services::{build_provider, GenerationProvider};
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::config::Config as CoreConfig;
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    tracing::{http_trace_layer, request_id_middleware},
};
use service_core::observability::init_metrics;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn GenerationProvider>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .route("/generate", post(handlers::generate))
        .route("/refine", post(handlers::refine))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(http_trace_layer())
        .layer(from_fn(request_id_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application, constructing the provider selected in `config`.
    pub async fn build(config: GeneratorConfig) -> Result<Self, AppError> {
        let provider = build_provider(&config.provider).map_err(|e| {
            tracing::error!(provider = %config.provider.kind, error = %e, "Failed to initialize provider");
            AppError::ConfigError(anyhow::anyhow!(e))
        })?;

        tracing::info!(
            provider = %config.provider.kind,
            model = %config.provider.model,
            timeout_secs = config.provider.timeout_secs,
            "Initialized generation provider"
        );

        Self::build_with_provider(&config.common, provider).await
    }

    /// Build the application around an already constructed provider.
    pub async fn build_with_provider(
        config: &CoreConfig,
        provider: Arc<dyn GenerationProvider>,
    ) -> Result<Self, AppError> {
        init_metrics();

        let router = build_router(AppState { provider });

        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("AI Generator service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await
    }

    /// Run until `signal` resolves, then stop accepting connections and let
    /// in-flight requests finish.
    pub async fn run_with_graceful_shutdown<F>(self, signal: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(signal)
            .await
    }
}
