//! Configuration for the generation service and the invoker.
//!
//! Defaults cover everything except the API key:
//!
//! ```ignore
//! let config = SaathiConfig::new("sk-or-...")
//!     .with_model("openai/gpt-4o-mini")
//!     .with_retries(2);
//! let flows = Flows::new(config.build_invoker()?)?;
//! ```
//!
//! Or from the environment (`OPENROUTER_KEY`, plus optional `SAATHI_MODEL`,
//! `SAATHI_MAX_RETRIES` and `SAATHI_TIMEOUT_SECS`):
//!
//! ```ignore
//! let config = SaathiConfig::from_env()?;
//! ```

use std::time::Duration;

use crate::api::retry::RetryConfig;
use crate::error::TransportError;
use crate::invoker::{Invoker, InvokerConfig};
use crate::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL, OpenRouterClient, Plugin};

pub const API_KEY_VAR: &str = "OPENROUTER_KEY";
pub const MODEL_VAR: &str = "SAATHI_MODEL";
pub const MAX_RETRIES_VAR: &str = "SAATHI_MAX_RETRIES";
pub const TIMEOUT_VAR: &str = "SAATHI_TIMEOUT_SECS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is not set")]
    MissingVar(&'static str),
    #[error("{var} must be {expected}, got {value:?}")]
    InvalidVar {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("failed to create API client: {0}")]
    Client(#[from] TransportError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaathiConfig {
    pub api_key: String,
    /// Default: `z-ai/glm-5`.
    pub model: String,
    /// Default: 1024.
    pub max_tokens: u32,
    /// Default: 0.7.
    pub temperature: f32,
    /// Per-request HTTP timeout. Default: 120 s.
    pub timeout: Duration,
    /// Default: no retries.
    pub retry: RetryConfig,
    /// Ask the service to repair malformed JSON replies. Default: on.
    pub response_healing: bool,
    pub referer: String,
    pub title: String,
}

impl SaathiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: 0.7,
            timeout: Duration::from_secs(120),
            retry: RetryConfig::default(),
            response_healing: true,
            referer: "https://github.com/saathi-ai/saathi-rs".to_string(),
            title: "saathi-rs".to_string(),
        }
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup(API_KEY_VAR)
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingVar(API_KEY_VAR))?;
        let mut config = Self::new(api_key);

        if let Some(model) = lookup(MODEL_VAR).filter(|m| !m.trim().is_empty()) {
            config.model = model;
        }
        if let Some(raw) = lookup(MAX_RETRIES_VAR) {
            let retries = raw.trim().parse::<u32>().map_err(|_| ConfigError::InvalidVar {
                var: MAX_RETRIES_VAR,
                expected: "a non-negative integer",
                value: raw.clone(),
            })?;
            config.retry = RetryConfig::with_retries(retries);
        }
        if let Some(raw) = lookup(TIMEOUT_VAR) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| ConfigError::InvalidVar {
                    var: TIMEOUT_VAR,
                    expected: "a positive number of seconds",
                    value: raw.clone(),
                })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retry.max_retries = retries;
        self
    }

    pub fn with_response_healing(mut self, enabled: bool) -> Self {
        self.response_healing = enabled;
        self
    }

    pub fn invoker_config(&self) -> InvokerConfig {
        InvokerConfig {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            retry: self.retry.clone(),
        }
    }

    pub fn build_client(&self) -> Result<OpenRouterClient, ConfigError> {
        let client = OpenRouterClient::with_headers(
            self.api_key.clone(),
            self.referer.clone(),
            self.title.clone(),
            self.timeout,
        )?;
        Ok(if self.response_healing {
            client.with_plugin(Plugin::ResponseHealing)
        } else {
            client
        })
    }

    /// An invoker backed by the OpenRouter client.
    pub fn build_invoker(&self) -> Result<Invoker, ConfigError> {
        Ok(Invoker::new(self.build_client()?, self.invoker_config()))
    }
}
