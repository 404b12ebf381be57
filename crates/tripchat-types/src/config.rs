//! Configuration types for tripchat.
//!
//! `TripchatConfig` represents `config.toml`. Every field has a default, so an
//! empty file (or no file at all) yields a working configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::chat::DEFAULT_MAX_HISTORY;
use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripchatConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl TripchatConfig {
    /// Reject values that would make the service misbehave at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.max_history == 0 {
            return Err(ConfigError::Validation(
                "session.max_history must be greater than zero".to_string(),
            ));
        }
        if self.session.ttl_secs == 0 {
            return Err(ConfigError::Validation(
                "session.ttl_secs must be greater than zero".to_string(),
            ));
        }
        if self.session.reaper_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "session.reaper_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.completion.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "completion.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.completion.provider == ProviderKind::Custom
            && self.completion.base_url.as_deref().is_none_or(|u| u.trim().is_empty())
        {
            return Err(ConfigError::Validation(
                "completion.base_url is required when completion.provider = \"custom\"".to_string(),
            ));
        }
        if self.search.limit == 0 {
            return Err(ConfigError::Validation(
                "search.limit must be greater than zero".to_string(),
            ));
        }
        if self.search.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "search.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// In-memory session retention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum turns kept per conversation (oldest dropped first).
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    /// Idle time after which a session is evicted.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// How often the reaper sweeps for idle sessions.
    #[serde(default = "default_reaper_interval_secs")]
    pub reaper_interval_secs: u64,
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn reaper_interval(&self) -> Duration {
        Duration::from_secs(self.reaper_interval_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
            ttl_secs: default_ttl_secs(),
            reaper_interval_secs: default_reaper_interval_secs(),
        }
    }
}

fn default_max_history() -> usize {
    DEFAULT_MAX_HISTORY
}

fn default_ttl_secs() -> u64 {
    3600
}

fn default_reaper_interval_secs() -> u64 {
    3600
}

/// Which OpenAI-compatible endpoint family serves completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Gemini,
    Mistral,
    Custom,
}

impl Default for ProviderKind {
    fn default() -> Self {
        ProviderKind::OpenAi
    }
}

/// Completion Service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    /// Overrides the provider's default base URL.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_completion_timeout_secs")]
    pub timeout_secs: u64,
}

impl CompletionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            base_url: None,
            model: default_model(),
            api_key_env: default_api_key_env(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_completion_timeout_secs(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "TRIPCHAT_COMPLETION_API_KEY".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f64 {
    0.7
}

fn default_completion_timeout_secs() -> u64 {
    30
}

/// Content Search Service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Base URL of the posts service. When unset, lookups always find nothing.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_search_limit")]
    pub limit: usize,
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
}

impl SearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            limit: default_search_limit(),
            timeout_secs: default_search_timeout_secs(),
        }
    }
}

fn default_search_limit() -> usize {
    10
}

fn default_search_timeout_secs() -> u64 {
    5
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}
