//! Environment-driven configuration for the HTTP source.

use std::time::Duration;

use crate::SourceError;

/// Default request timeout when `SENTINEL_HTTP_TIMEOUT_SECS` is unset.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default retry budget when `SENTINEL_HTTP_MAX_RETRIES` is unset.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Connection settings for the Sentinel REST backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Base URL of the backend, without a trailing slash.
    pub api_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retries for transient failures (connect errors, timeouts, 429, 5xx).
    pub max_retries: u32,
}

impl SourceConfig {
    /// Creates a config with default timeout and retry budget.
    #[must_use]
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Reads the config from the environment.
    ///
    /// `SENTINEL_API_URL` (or the legacy `API_URL`) is required.
    /// `SENTINEL_HTTP_TIMEOUT_SECS` and `SENTINEL_HTTP_MAX_RETRIES` are
    /// optional; unparseable values fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Config`] if no API URL is set.
    pub fn from_env() -> Result<Self, SourceError> {
        let api_url = std::env::var("SENTINEL_API_URL")
            .or_else(|_| std::env::var("API_URL"))
            .map_err(|_| SourceError::Config {
                message: "SENTINEL_API_URL environment variable not set".to_string(),
            })?;

        Ok(Self::with_env_overrides(&api_url))
    }

    /// Builds a config for `api_url`, taking only the optional timeout and
    /// retry settings from the environment.
    #[must_use]
    pub fn with_env_overrides(api_url: &str) -> Self {
        Self::from_parts(
            api_url,
            std::env::var("SENTINEL_HTTP_TIMEOUT_SECS").ok().as_deref(),
            std::env::var("SENTINEL_HTTP_MAX_RETRIES").ok().as_deref(),
        )
    }

    fn from_parts(api_url: &str, timeout_secs: Option<&str>, max_retries: Option<&str>) -> Self {
        let mut config = Self::new(api_url);
        if let Some(secs) = timeout_secs.and_then(|s| s.trim().parse::<u64>().ok()) {
            config.timeout = Duration::from_secs(secs);
        } else if let Some(raw) = timeout_secs {
            log::warn!("Ignoring invalid SENTINEL_HTTP_TIMEOUT_SECS={raw:?}");
        }
        if let Some(retries) = max_retries.and_then(|s| s.trim().parse::<u32>().ok()) {
            config.max_retries = retries;
        } else if let Some(raw) = max_retries {
            log::warn!("Ignoring invalid SENTINEL_HTTP_MAX_RETRIES={raw:?}");
        }
        config
    }
}
