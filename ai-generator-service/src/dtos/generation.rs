use serde::{Deserialize, Serialize};
use service_core::utils::not_blank;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateRequest {
    #[validate(custom(function = "not_blank", message = "Prompt is required"))]
    pub prompt: String,

    /// Free text describing the brand's look and voice.
    #[serde(default)]
    pub brand_context: Option<String>,

    /// Extra rules appended to the system prompt.
    #[serde(default)]
    pub constraints: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub html: String,
    /// The prompt exactly as received.
    pub prompt: String,
    pub timestamp: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefineRequest {
    #[validate(custom(function = "not_blank", message = "Current HTML is required"))]
    pub current_html: String,

    #[validate(custom(function = "not_blank", message = "Refinement request is required"))]
    pub refinement_request: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefineResponse {
    pub success: bool,
    pub html: String,
    /// The refinement request exactly as received.
    pub refinement: String,
    pub timestamp: String,
}
