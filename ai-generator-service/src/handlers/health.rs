use axum::{
    http::{StatusCode, Uri},
    Json,
};
use serde_json::{json, Value};
use service_core::error::AppError;

pub const HEALTH_STATUS: &str = "AI Generator service is running";

/// Liveness probe. Never touches the provider.
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": HEALTH_STATUS }))
}

/// Readiness probe. The provider is wired before the listener is bound, so a
/// serving process is ready.
pub async fn readiness_check() -> StatusCode {
    StatusCode::OK
}

pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(anyhow::anyhow!("No route for {}", uri.path()))
}
