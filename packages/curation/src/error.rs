//! Typed errors for the curation pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to keep the failure
//! taxonomy explicit: transient network trouble, missing credentials,
//! unparseable model output, and cache store I/O are handled differently
//! by the callers.

use thiserror::Error;

/// Errors raised by an extraction provider.
///
/// All variants except [`ProviderError::MissingCredentials`] are recoverable
/// at the orchestrator: the URL is skipped and the batch continues.
/// Missing credentials are detected once, at provider construction.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Required credential is not configured.
    #[error("{provider}: {variable} is not set")]
    MissingCredentials {
        provider: &'static str,
        variable: &'static str,
    },

    /// HTTP transport failure (connect, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// Provider returned a non-2xx status.
    #[error("provider returned HTTP {status}: {detail}")]
    Status { status: u16, detail: String },

    /// The call exceeded its timeout.
    #[error("provider call timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Provider responded, but the body held no parseable extraction.
    #[error("malformed provider response: {detail}")]
    MalformedResponse { detail: String },
}

impl ProviderError {
    /// Map a reqwest failure, distinguishing timeouts from transport errors.
    pub fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout {
                seconds: timeout_secs,
            }
        } else {
            ProviderError::Http(err)
        }
    }
}

/// Errors from the durable URL cache store.
///
/// Both directions are non-fatal: unreadable stores fall back to an empty
/// cache, failed persists lose only the current run's new entries.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Filesystem failure while reading or writing the store.
    #[error("cache store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store exists but is not valid JSON.
    #[error("cache store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Errors raised while assembling the pipeline from configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more required environment variables are missing.
    #[error("missing configuration: {}", missing.join(", "))]
    MissingVariables { missing: Vec<String> },

    /// A variable is set but cannot be parsed.
    #[error("invalid value for {variable}: {value}")]
    InvalidValue { variable: String, value: String },
}

/// Top-level error for pipeline assembly and artifact writing.
///
/// Per-URL and per-query failures never surface here; they are logged and
/// absorbed so the run always reaches aggregation.
#[derive(Debug, Error)]
pub enum CurationError {
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("artifact write failed: {0}")]
    Output(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for pipeline-level operations.
pub type Result<T> = std::result::Result<T, CurationError>;

/// Result alias for provider calls.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;
