use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Default outbound timeout for provider calls, in seconds.
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub common: core_config::Config,
    pub provider: ProviderSettings,
}

/// Which external model provider backs the service. Chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::OpenAi => write!(f, "openai"),
            ProviderKind::Anthropic => write!(f, "anthropic"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" => Ok(ProviderKind::Anthropic),
            other => Err(format!(
                "Unknown provider '{}', expected 'openai' or 'anthropic'",
                other
            )),
        }
    }
}

impl ProviderKind {
    fn api_key_var(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    fn model_var(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_MODEL",
            ProviderKind::Anthropic => "ANTHROPIC_MODEL",
        }
    }

    fn base_url_var(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_BASE_URL",
            ProviderKind::Anthropic => "ANTHROPIC_BASE_URL",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-4",
            ProviderKind::Anthropic => "claude-3-5-sonnet-latest",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com/v1",
            ProviderKind::Anthropic => "https://api.anthropic.com/v1",
        }
    }

    /// Default output budget for the generate operation.
    pub fn default_generate_max_tokens(self) -> u32 {
        match self {
            ProviderKind::OpenAi => 2000,
            ProviderKind::Anthropic => 4096,
        }
    }

    /// Default output budget for the refine operation.
    pub fn default_refine_max_tokens(self) -> u32 {
        match self {
            ProviderKind::OpenAi => 2000,
            ProviderKind::Anthropic => 2048,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub api_key: Secret<String>,
    pub model: String,
    pub base_url: String,
    pub generate_max_tokens: u32,
    pub refine_max_tokens: u32,
    pub timeout_secs: u64,
}

impl ProviderSettings {
    /// Settings for `kind` with every optional value at its default.
    pub fn with_defaults(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            kind,
            api_key: Secret::new(api_key.into()),
            model: kind.default_model().to_string(),
            base_url: kind.default_base_url().to_string(),
            generate_max_tokens: kind.default_generate_max_tokens(),
            refine_max_tokens: kind.default_refine_max_tokens(),
            timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
        }
    }

    /// Resolve provider settings through `lookup`, which maps a variable name
    /// to its value. Only the credential of the selected provider is read.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let kind: ProviderKind = get_env(&lookup, "GENERATOR_PROVIDER", Some("openai"))?
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let api_key = get_env(&lookup, kind.api_key_var(), None)?;
        if api_key.trim().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "{} is set but empty",
                kind.api_key_var()
            )));
        }

        Ok(Self {
            kind,
            api_key: Secret::new(api_key),
            model: get_env(&lookup, kind.model_var(), Some(kind.default_model()))?,
            base_url: get_env(&lookup, kind.base_url_var(), Some(kind.default_base_url()))?
                .trim_end_matches('/')
                .to_string(),
            generate_max_tokens: parse_env(
                &lookup,
                "GENERATE_MAX_TOKENS",
                kind.default_generate_max_tokens(),
            )?,
            refine_max_tokens: parse_env(
                &lookup,
                "REFINE_MAX_TOKENS",
                kind.default_refine_max_tokens(),
            )?,
            timeout_secs: parse_env(
                &lookup,
                "PROVIDER_TIMEOUT_SECS",
                DEFAULT_PROVIDER_TIMEOUT_SECS,
            )?,
        })
    }
}

impl GeneratorConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let provider = ProviderSettings::from_lookup(|key| env::var(key).ok())?;

        Ok(GeneratorConfig { common, provider })
    }
}

fn get_env<F>(lookup: &F, key: &str, default: Option<&str>) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => Ok(val),
        None => match default {
            Some(def) => Ok(def.to_string()),
            None => Err(AppError::ConfigError(anyhow::anyhow!(
                "{} is required but not set",
                key
            ))),
        },
    }
}

fn parse_env<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e))
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_openai_with_standard_budgets() {
        let settings = ProviderSettings::from_lookup(lookup_from(&[("OPENAI_API_KEY", "sk-test")]))
            .expect("settings");

        assert_eq!(settings.kind, ProviderKind::OpenAi);
        assert_eq!(settings.api_key.expose_secret(), "sk-test");
        assert_eq!(settings.model, "gpt-4");
        assert_eq!(settings.base_url, "https://api.openai.com/v1");
        assert_eq!(settings.generate_max_tokens, 2000);
        assert_eq!(settings.refine_max_tokens, 2000);
        assert_eq!(settings.timeout_secs, 120);
    }

    #[test]
    fn anthropic_reads_its_own_credential_only() {
        let settings = ProviderSettings::from_lookup(lookup_from(&[
            ("GENERATOR_PROVIDER", "Anthropic"),
            ("ANTHROPIC_API_KEY", "ak-test"),
            ("ANTHROPIC_BASE_URL", "http://localhost:9999/v1/"),
        ]))
        .expect("settings");

        assert_eq!(settings.kind, ProviderKind::Anthropic);
        assert_eq!(settings.api_key.expose_secret(), "ak-test");
        assert_eq!(settings.base_url, "http://localhost:9999/v1");
        assert_eq!(settings.generate_max_tokens, 4096);
        assert_eq!(settings.refine_max_tokens, 2048);
    }

    #[test]
    fn missing_credential_is_config_error() {
        let result = ProviderSettings::from_lookup(lookup_from(&[
            ("GENERATOR_PROVIDER", "anthropic"),
            ("OPENAI_API_KEY", "sk-test"),
        ]));

        match result {
            Err(AppError::ConfigError(e)) => {
                assert!(e.to_string().contains("ANTHROPIC_API_KEY"));
            }
            other => panic!("expected config error, got {:?}", other.map(|s| s.kind)),
        }
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let result = ProviderSettings::from_lookup(lookup_from(&[
            ("GENERATOR_PROVIDER", "gemini"),
            ("OPENAI_API_KEY", "sk-test"),
        ]));
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn budget_and_timeout_overrides_are_parsed() {
        let settings = ProviderSettings::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("GENERATE_MAX_TOKENS", "1500"),
            ("REFINE_MAX_TOKENS", "800"),
            ("PROVIDER_TIMEOUT_SECS", "30"),
        ]))
        .expect("settings");

        assert_eq!(settings.generate_max_tokens, 1500);
        assert_eq!(settings.refine_max_tokens, 800);
        assert_eq!(settings.timeout_secs, 30);
    }

    #[test]
    fn invalid_number_is_config_error() {
        let result = ProviderSettings::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("PROVIDER_TIMEOUT_SECS", "soon"),
        ]));
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }
}
