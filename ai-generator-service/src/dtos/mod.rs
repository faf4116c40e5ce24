pub mod generation;

pub use generation::{GenerateRequest, GenerateResponse, RefineRequest, RefineResponse};

use chrono::{SecondsFormat, Utc};

/// Current UTC time as RFC 3339 with millisecond precision and a `Z` suffix.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
