//! Prompt templates for HTML generation and refinement.
//!
//! Templates are rebuilt on every call; nothing here holds state.

/// Brand context used when the caller does not supply one.
pub const DEFAULT_BRAND_CONTEXT: &str = "Modern, clean, professional design";

const GENERATION_PREAMBLE: &str = "You are a web developer creating HTML content for a website.";

const GENERATION_RULES: &str = "\
- Generate HTML structure only, no <style> tags
- Use Tailwind CSS classes
- Create semantic, accessible HTML
- Focus on conversion-oriented copy
- Generate only main content area (no header/footer)";

pub const REFINEMENT_SYSTEM_PROMPT: &str = "You are refining HTML content. Keep the same structure but modify based on the user's request. Return only the updated HTML.";

/// One system instruction followed by a single user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptExchange {
    pub system: String,
    pub user: String,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Build the generation system prompt. Absent or empty `brand_context`
/// falls back to [`DEFAULT_BRAND_CONTEXT`]; absent `constraints` leaves the
/// template skeleton unchanged. Any other value, whitespace included, is
/// inserted as given.
pub fn generation_system_prompt(brand_context: Option<&str>, constraints: Option<&str>) -> String {
    format!(
        "{}\n\nBRAND CONTEXT:\n{}\n\nCONSTRAINTS:\n{}\n\n{}",
        GENERATION_PREAMBLE,
        non_empty(brand_context).unwrap_or(DEFAULT_BRAND_CONTEXT),
        GENERATION_RULES,
        non_empty(constraints).unwrap_or_default(),
    )
}

pub fn generation_exchange(
    prompt: &str,
    brand_context: Option<&str>,
    constraints: Option<&str>,
) -> PromptExchange {
    PromptExchange {
        system: generation_system_prompt(brand_context, constraints),
        user: prompt.to_string(),
    }
}

pub fn refinement_exchange(current_html: &str, refinement_request: &str) -> PromptExchange {
    PromptExchange {
        system: REFINEMENT_SYSTEM_PROMPT.to_string(),
        user: format!(
            "Current HTML:\n{}\n\nPlease modify it to: {}",
            current_html, refinement_request
        ),
    }
}
