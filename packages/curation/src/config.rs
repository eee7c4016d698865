//! Pipeline configuration.
//!
//! One explicit struct built at process start and passed into the
//! components; no global mutable state. The CLI loads `.env` (dotenvy)
//! before calling [`PipelineConfig::from_env`], so the library itself
//! never touches files for configuration.

use std::path::PathBuf;

use crate::error::ConfigError;
use crate::secrets::SecretString;

/// Default per-query search result count (high-priority ceiling).
pub const DEFAULT_RESULTS_PER_QUERY: usize = 6;

/// Default overall token budget for a provider call.
pub const DEFAULT_MAX_TOKENS: usize = 2048;

/// Default character cap for the Dify workflow path.
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 8000;

/// Which extraction service backs the pipeline.
#[derive(Debug, Clone)]
pub enum ProviderSettings {
    OpenAi {
        api_key: SecretString,
        model: String,
    },
    Anthropic {
        api_key: SecretString,
        model: String,
    },
    Gemini {
        api_key: SecretString,
        model: String,
    },
    /// Workflow-style blocking call against a Dify deployment.
    Dify {
        api_key: SecretString,
        base_url: String,
        workflow_id: Option<String>,
    },
}

impl ProviderSettings {
    pub fn provider_name(&self) -> &'static str {
        match self {
            ProviderSettings::OpenAi { .. } => "openai",
            ProviderSettings::Anthropic { .. } => "claude",
            ProviderSettings::Gemini { .. } => "gemini",
            ProviderSettings::Dify { .. } => "dify",
        }
    }
}

/// Everything the pipeline needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub google_api_key: SecretString,
    pub google_engine_id: String,

    pub provider: ProviderSettings,

    /// Overall token budget per provider call; the prompt overhead and a
    /// reserved response allowance come out of this.
    pub max_tokens: usize,

    /// Character cap applied to article text on the Dify path.
    pub max_text_length: usize,

    /// Result-count ceiling for high-priority queries.
    pub results_per_query: usize,

    /// Sustained request rate against third-party services.
    pub requests_per_second: u32,

    /// Pause inserted when the processed brand changes, in seconds.
    pub brand_pause_secs: u64,

    pub cache_path: PathBuf,

    pub output_dir: PathBuf,

    /// When set, the run processes this single query instead of the
    /// planned batch.
    pub single_query: Option<String>,
}

impl PipelineConfig {
    /// Build the configuration from the process environment.
    ///
    /// Reports every missing credential at once, scoped to the selected
    /// provider: an unset Gemini key does not matter when OpenAI is the
    /// active provider.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut missing = Vec::new();

        let google_api_key = SecretString::from_env("GOOGLE_SEARCH_API_KEY");
        if google_api_key.is_none() {
            missing.push("GOOGLE_SEARCH_API_KEY".to_string());
        }
        let google_engine_id = env_string("GOOGLE_SEARCH_ENGINE_ID");
        if google_engine_id.is_none() {
            missing.push("GOOGLE_SEARCH_ENGINE_ID".to_string());
        }

        let use_dify = env_string("USE_DIFY")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(true);

        let provider = if use_dify {
            match SecretString::from_env("DIFY_API_KEY") {
                Some(api_key) => Some(ProviderSettings::Dify {
                    api_key,
                    base_url: env_string("DIFY_API_URL")
                        .unwrap_or_else(|| "https://api.dify.ai/v1".to_string()),
                    workflow_id: env_string("DIFY_WORKFLOW_ID"),
                }),
                None => {
                    missing.push("DIFY_API_KEY".to_string());
                    None
                }
            }
        } else {
            let provider_name =
                env_string("LLM_PROVIDER").unwrap_or_else(|| "gemini".to_string());
            match provider_name.to_ascii_lowercase().as_str() {
                "openai" => match SecretString::from_env("OPENAI_API_KEY") {
                    Some(api_key) => Some(ProviderSettings::OpenAi {
                        api_key,
                        model: env_string("OPENAI_MODEL")
                            .unwrap_or_else(|| "gpt-4o-mini".to_string()),
                    }),
                    None => {
                        missing.push("OPENAI_API_KEY".to_string());
                        None
                    }
                },
                "claude" => match SecretString::from_env("CLAUDE_API_KEY") {
                    Some(api_key) => Some(ProviderSettings::Anthropic {
                        api_key,
                        model: env_string("CLAUDE_MODEL")
                            .unwrap_or_else(|| "claude-3-haiku-20240307".to_string()),
                    }),
                    None => {
                        missing.push("CLAUDE_API_KEY".to_string());
                        None
                    }
                },
                "gemini" => match SecretString::from_env("GEMINI_API_KEY") {
                    Some(api_key) => Some(ProviderSettings::Gemini {
                        api_key,
                        model: env_string("GEMINI_MODEL")
                            .unwrap_or_else(|| "gemini-1.5-flash".to_string()),
                    }),
                    None => {
                        missing.push("GEMINI_API_KEY".to_string());
                        None
                    }
                },
                other => {
                    return Err(ConfigError::InvalidValue {
                        variable: "LLM_PROVIDER".to_string(),
                        value: other.to_string(),
                    });
                }
            }
        };

        if !missing.is_empty() {
            return Err(ConfigError::MissingVariables { missing });
        }

        Ok(Self {
            google_api_key: google_api_key.expect("checked above"),
            google_engine_id: google_engine_id.expect("checked above"),
            provider: provider.expect("checked above"),
            max_tokens: env_parsed("MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
            max_text_length: env_parsed("MAX_TEXT_LENGTH", DEFAULT_MAX_TEXT_LENGTH)?,
            results_per_query: env_parsed("RESULTS_PER_QUERY", DEFAULT_RESULTS_PER_QUERY)?,
            requests_per_second: env_parsed("REQUESTS_PER_SECOND", 1)?,
            brand_pause_secs: env_parsed("BRAND_PAUSE_SECS", 10)?,
            cache_path: env_string("CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("url_cache.json")),
            output_dir: env_string("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            single_query: env_string("SEARCH_QUERY"),
        })
    }
}

fn env_string(variable: &str) -> Option<String> {
    match std::env::var(variable) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

fn env_parsed<T: std::str::FromStr>(variable: &str, default: T) -> Result<T, ConfigError> {
    match env_string(variable) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            variable: variable.to_string(),
            value: raw,
        }),
    }
}
