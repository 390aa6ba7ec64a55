//! Centralized server configuration.
//!
//! Loaded via the `config` crate from environment variables. The
//! credentials have no defaults; everything else does.

use chatrelay_ai::OpenAiConfig;
use chatrelay_ai::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use chatrelay_channel::line::LineConfig;
use chatrelay_channel::line::client::{DEFAULT_API_BASE_URL, MAX_TEXT_LENGTH};
use chatrelay_relay::{DEFAULT_SYSTEM_INSTRUCTION, RelayConfig};
use serde::Deserialize;
use std::time::Duration;

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// LINE channel access token.
    pub line_access_token: String,

    /// LINE channel secret, used to verify webhook signatures.
    pub line_secret: String,

    /// API key for the chat completion service.
    pub openai_api_key: String,

    /// Chat completion model.
    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// Base URL of the chat completion service.
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    /// Base URL of the LINE Messaging API.
    #[serde(default = "default_line_api_base_url")]
    pub line_api_base_url: String,

    /// Listen address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum turns kept per user, system turn included.
    #[serde(default = "default_max_history_length")]
    pub max_history_length: usize,

    /// Seconds of inactivity after which a user's history is forgotten.
    #[serde(default = "default_expiration_time")]
    pub expiration_time: u64,

    /// Maximum characters per outbound message.
    #[serde(default = "default_max_chunk_length")]
    pub max_chunk_length: usize,

    /// Seconds to wait for a completion before sending a fallback reply.
    #[serde(default = "default_completion_timeout")]
    pub completion_timeout: u64,

    /// Instruction placed at the head of every dialogue.
    #[serde(default = "default_system_instruction")]
    pub system_instruction: String,
}

fn default_openai_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_openai_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_line_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_history_length() -> usize {
    30
}

fn default_expiration_time() -> u64 {
    7200
}

fn default_max_chunk_length() -> usize {
    MAX_TEXT_LENGTH
}

fn default_completion_timeout() -> u64 {
    60
}

fn default_system_instruction() -> String {
    DEFAULT_SYSTEM_INSTRUCTION.to_string()
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(config::Environment::default())
    }

    fn from_environment(environment: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(environment.separator("__").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Address to bind the HTTP listener to.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Settings for the relay core.
    #[must_use]
    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            max_history_length: self.max_history_length,
            expiration_time: self.expiration_time,
            max_chunk_length: self.max_chunk_length,
            completion_timeout: self.completion_timeout,
            system_instruction: self.system_instruction.clone(),
        }
    }

    /// Settings for the chat completion client.
    #[must_use]
    pub fn openai_config(&self) -> OpenAiConfig {
        OpenAiConfig::new(self.openai_api_key.clone())
            .with_base_url(self.openai_base_url.clone())
            .with_model(self.openai_model.clone())
            .with_timeout(Duration::from_secs(self.completion_timeout))
    }

    /// Settings for the LINE client.
    #[must_use]
    pub fn line_config(&self) -> LineConfig {
        LineConfig::new(self.line_access_token.clone())
            .with_api_base_url(self.line_api_base_url.clone())
    }
}
