use axum::{extract::State, Json};
use service_core::error::AppError;
use service_core::utils::ValidatedJson;

use crate::dtos::{
    timestamp_now, GenerateRequest, GenerateResponse, RefineRequest, RefineResponse,
};
use crate::services::ProviderError;
use crate::startup::AppState;

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        AppError::ProviderError(err.to_string())
    }
}

/// Generate an HTML fragment from a natural-language prompt.
pub async fn generate(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let html = state
        .provider
        .generate(
            &req.prompt,
            req.brand_context.as_deref(),
            req.constraints.as_deref(),
        )
        .await
        .map_err(|e| {
            tracing::error!(
                operation = "generate",
                provider = state.provider.name(),
                error = %e,
                "Generation failed"
            );
            AppError::from(e)
        })?;

    Ok(Json(GenerateResponse {
        success: true,
        html,
        prompt: req.prompt,
        timestamp: timestamp_now(),
    }))
}

/// Rewrite an existing HTML fragment according to a change request.
pub async fn refine(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefineRequest>,
) -> Result<Json<RefineResponse>, AppError> {
    let html = state
        .provider
        .refine(&req.current_html, &req.refinement_request)
        .await
        .map_err(|e| {
            tracing::error!(
                operation = "refine",
                provider = state.provider.name(),
                error = %e,
                "Refinement failed"
            );
            AppError::from(e)
        })?;

    Ok(Json(RefineResponse {
        success: true,
        html,
        refinement: req.refinement_request,
        timestamp: timestamp_now(),
    }))
}
