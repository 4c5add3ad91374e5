//! Settings Models
//!
//! Application configuration and settings data structures.

use std::path::PathBuf;

use agent_blueprint_llm::ProviderConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::services::requirements::DEFAULT_HISTORY_WINDOW;

/// Environment variable holding the backend API key
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable overriding the model name
pub const ENV_MODEL: &str = "LLM_MODEL";
/// Environment variable overriding the provider token limit
pub const ENV_MAX_TOKENS: &str = "LLM_MAX_TOKENS";
/// Environment variable overriding the sampling temperature
pub const ENV_TEMPERATURE: &str = "LLM_TEMPERATURE";
/// Environment variable overriding the API base URL
pub const ENV_BASE_URL: &str = "LLM_BASE_URL";

fn default_history_window() -> usize {
    DEFAULT_HISTORY_WINDOW
}

/// Application configuration stored in config.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Backend provider settings (the API key is never written to disk)
    pub provider: ProviderConfig,
    /// Number of most recent history entries rendered into each prompt
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    /// Response-size bound for conversation turns; falls back to the
    /// provider's `max_tokens` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_max_tokens: Option<u32>,
    /// Schema descriptor file; the built-in schema is used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_path: Option<PathBuf>,
    /// Enable debug mode
    pub debug_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            history_window: DEFAULT_HISTORY_WINDOW,
            reply_max_tokens: None,
            schema_path: None,
            debug_mode: false,
        }
    }
}

/// Settings update request (partial update)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsUpdate {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub history_window: Option<usize>,
    pub reply_max_tokens: Option<u32>,
    pub schema_path: Option<PathBuf>,
    pub debug_mode: Option<bool>,
}

impl AppConfig {
    /// Apply a partial update to the configuration
    pub fn apply_update(&mut self, update: SettingsUpdate) {
        if let Some(model) = update.model {
            self.provider = self.provider.clone().with_model(model);
        }
        if let Some(base_url) = update.base_url {
            self.provider = self.provider.clone().with_base_url(base_url);
        }
        if let Some(window) = update.history_window {
            self.history_window = window;
        }
        if let Some(max_tokens) = update.reply_max_tokens {
            self.reply_max_tokens = Some(max_tokens);
        }
        if let Some(path) = update.schema_path {
            self.schema_path = Some(path);
        }
        if let Some(debug) = update.debug_mode {
            self.debug_mode = debug;
        }
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup. Empty values are
    /// ignored; unparseable numbers are logged and ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(api_key) = get(ENV_API_KEY) {
            self.provider = self.provider.clone().with_api_key(api_key);
        }
        if let Some(model) = get(ENV_MODEL) {
            self.provider = self.provider.clone().with_model(model.trim());
        }
        if let Some(base_url) = get(ENV_BASE_URL) {
            self.provider = self.provider.clone().with_base_url(base_url.trim());
        }
        if let Some(raw) = get(ENV_MAX_TOKENS) {
            match raw.trim().parse::<u32>() {
                Ok(max_tokens) => {
                    self.provider = self.provider.clone().with_max_tokens(max_tokens);
                }
                Err(e) => warn!(key = ENV_MAX_TOKENS, value = %raw, error = %e, "Ignoring invalid override"),
            }
        }
        if let Some(raw) = get(ENV_TEMPERATURE) {
            match raw.trim().parse::<f32>() {
                Ok(temperature) => {
                    self.provider = self.provider.clone().with_temperature(temperature);
                }
                Err(e) => warn!(key = ENV_TEMPERATURE, value = %raw, error = %e, "Ignoring invalid override"),
            }
        }
    }

    /// Token bound used for conversation turns
    pub fn effective_reply_max_tokens(&self) -> u32 {
        self.reply_max_tokens.unwrap_or(self.provider.max_tokens)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.provider.validate()?;

        if self.history_window == 0 {
            return Err("history_window must be at least 1".to_string());
        }

        if self.reply_max_tokens == Some(0) {
            return Err("reply_max_tokens must be greater than 0".to_string());
        }

        Ok(())
    }
}
