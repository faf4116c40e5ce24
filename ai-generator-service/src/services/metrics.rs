//! Provider-call metrics for ai-generator-service.
//!
//! Recorded through the `metrics` facade; the Prometheus recorder installed
//! by `service_core::observability` exposes them on /metrics.

use super::providers::{Completion, Operation, ProviderError};
use ::metrics::{counter, histogram};
use std::time::Duration;

pub const PROVIDER_REQUESTS_TOTAL: &str = "generator_provider_requests_total";
pub const PROVIDER_LATENCY_SECONDS: &str = "generator_provider_latency_seconds";
pub const PROVIDER_TOKENS_TOTAL: &str = "generator_provider_tokens_total";

/// Record the outcome, latency and token usage of one provider call.
pub fn record_provider_call(
    provider: &str,
    operation: Operation,
    result: &Result<Completion, ProviderError>,
    elapsed: Duration,
) {
    let outcome = match result {
        Ok(_) => "success",
        Err(e) => e.kind(),
    };

    counter!(
        PROVIDER_REQUESTS_TOTAL,
        "provider" => provider.to_string(),
        "operation" => operation.as_str(),
        "outcome" => outcome
    )
    .increment(1);

    histogram!(
        PROVIDER_LATENCY_SECONDS,
        "provider" => provider.to_string(),
        "operation" => operation.as_str()
    )
    .record(elapsed.as_secs_f64());

    if let Ok(completion) = result {
        record_tokens(provider, completion.input_tokens, completion.output_tokens);
    }
}

/// Record token usage reported by the provider.
pub fn record_tokens(provider: &str, input_tokens: u32, output_tokens: u32) {
    counter!(PROVIDER_TOKENS_TOTAL, "provider" => provider.to_string(), "type" => "input")
        .increment(u64::from(input_tokens));
    counter!(PROVIDER_TOKENS_TOTAL, "provider" => provider.to_string(), "type" => "output")
        .increment(u64::from(output_tokens));
}
