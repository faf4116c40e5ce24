use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};

use crate::error::AppError;

/// JSON body extractor that rejects malformed payloads with 400 and payloads
/// failing `validator` rules with 422, both in the shared error envelope.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let path = req.uri().path().to_string();

        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            tracing::warn!(path = %path, error = %e.body_text(), "Rejected malformed JSON body");
            AppError::BadRequest(anyhow::anyhow!("Json parse error: {}", e.body_text()))
        })?;

        value.validate().map_err(|e| {
            tracing::warn!(path = %path, error = %e, "Rejected invalid request body");
            AppError::from(e)
        })?;

        Ok(ValidatedJson(value))
    }
}

/// Rejects strings that are empty or whitespace only.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
