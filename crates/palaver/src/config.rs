//! Startup configuration read from the environment.

use std::env;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display};
use std::num::NonZeroU32;

use palaver_anthropic_model::{AnthropicConfig, AnthropicConfigBuilder};
use palaver_core::DEFAULT_MAX_OUTPUT_TOKENS;

/// Variable holding the API key.
pub const API_KEY_VAR: &str = "MY_ANTHROPIC_API_KEY";
/// Variable overriding the model.
pub const MODEL_VAR: &str = "PALAVER_MODEL";
/// Variable overriding the API base URL.
pub const BASE_URL_VAR: &str = "PALAVER_BASE_URL";
/// Variable overriding the output token bound.
pub const MAX_TOKENS_VAR: &str = "PALAVER_MAX_TOKENS";

/// The cheapest model, used when none is configured.
pub const DEFAULT_CLI_MODEL: &str = "claude-3-haiku-20240307";

/// Error raised when the configuration is unusable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The API key variable is unset or empty.
    MissingApiKey,
    /// The output token bound is not a positive integer.
    InvalidMaxTokens(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingApiKey => {
                write!(f, "{API_KEY_VAR} environment variable not set")
            }
            ConfigError::InvalidMaxTokens(value) => write!(
                f,
                "{MAX_TOKENS_VAR} must be a positive integer, got {value:?}"
            ),
        }
    }
}

impl StdError for ConfigError {}

/// Everything the CLI needs to start a session.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// The API key.
    pub api_key: String,
    /// The model identifier.
    pub model: String,
    /// A custom base URL, if any.
    pub base_url: Option<String>,
    /// The output token bound sent with every request.
    pub max_output_tokens: NonZeroU32,
}

impl Config {
    /// Reads the configuration from the process environment.
    #[inline]
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable
    /// name to its value.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let api_key =
            non_empty(API_KEY_VAR).ok_or(ConfigError::MissingApiKey)?;
        let model = non_empty(MODEL_VAR)
            .unwrap_or_else(|| DEFAULT_CLI_MODEL.to_owned());
        let base_url = non_empty(BASE_URL_VAR);
        let max_output_tokens = match non_empty(MAX_TOKENS_VAR) {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidMaxTokens(value))?,
            None => DEFAULT_MAX_OUTPUT_TOKENS,
        };

        Ok(Self {
            api_key,
            model,
            base_url,
            max_output_tokens,
        })
    }

    /// Builds the provider configuration.
    pub fn anthropic_config(&self) -> AnthropicConfig {
        let mut builder = AnthropicConfigBuilder::with_api_key(&self.api_key)
            .with_model(&self.model);
        if let Some(base_url) = &self.base_url {
            builder = builder.with_base_url(base_url);
        }
        builder.build()
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_output_tokens", &self.max_output_tokens)
            .finish()
    }
}
