pub mod metrics;
pub mod prompts;
pub mod providers;

pub use providers::{build_provider, GenerationProvider, ProviderError};
