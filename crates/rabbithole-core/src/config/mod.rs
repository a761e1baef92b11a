//! Configuration management for rabbithole.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `rabbithole.toml` file
//! 3. User config `~/.config/rabbithole/config.toml`
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,

    /// LLM provider configuration.
    pub llm: LLMConfig,

    /// Web search configuration.
    pub search: SearchConfig,

    /// Prompt and parsing configuration.
    pub query: QueryConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./rabbithole.toml` (project local)
    /// 2. `~/.config/rabbithole/config.toml` (user config)
    /// 3. Falls back to defaults
    ///
    /// Environment overrides are applied in every case.
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new("rabbithole.toml").exists() {
            return Self::from_file("rabbithole.toml");
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("rabbithole").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // Server overrides
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(n) = port.parse() {
                self.server.port = n;
            }
        }
        if let Ok(host) = std::env::var("RABBITHOLE_HOST") {
            self.server.host = host;
        }

        // LLM overrides
        if let Ok(provider) = std::env::var("RABBITHOLE_LLM_PROVIDER") {
            self.llm.provider = provider;
        }
        self.llm.provider = self.llm.provider_key();
        if let Ok(model) = std::env::var("RABBITHOLE_LLM_MODEL") {
            self.llm.model = Some(model);
        }
        if let Ok(url) = std::env::var("RABBITHOLE_LLM_BASE_URL") {
            self.llm.base_url = Some(url);
        }
        if let Ok(key) = std::env::var("RABBITHOLE_LLM_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Ok(tokens) = std::env::var("RABBITHOLE_LLM_MAX_TOKENS") {
            if let Ok(n) = tokens.parse() {
                self.llm.max_tokens = n;
            }
        }

        // Search overrides
        if let Ok(key) = std::env::var("TAVILY_API_KEY") {
            self.search.api_key = Some(key);
        }
        if let Ok(n) = std::env::var("RABBITHOLE_SEARCH_MAX_RESULTS") {
            if let Ok(n) = n.parse() {
                self.search.max_results = n;
            }
        }
    }

    /// Reject values that can never produce a working setup.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.search.max_results == 0 {
            return Err(ConfigError::Invalid(
                "search.max_results must be at least 1".to_string(),
            ));
        }
        if self.query.follow_up_count == 0 {
            return Err(ConfigError::Invalid(
                "query.follow_up_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        Config::default().to_toml_string()
    }

    /// Render this configuration as TOML. API keys are never written.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,

    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// LLM provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LLMConfig {
    /// Provider name: "gemini", "openai", "anthropic" or "ollama".
    pub provider: String,

    /// Model name (provider-specific).
    pub model: Option<String>,

    /// Base URL for API (for openai-compatible providers).
    pub base_url: Option<String>,

    /// API key (can also be set via environment variable).
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Maximum tokens for response.
    pub max_tokens: u32,

    /// API version (for Anthropic).
    pub api_version: Option<String>,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_LLM_PROVIDER.to_string(),
            model: None,
            base_url: None,
            api_key: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            api_version: Some(DEFAULT_ANTHROPIC_API_VERSION.to_string()),
        }
    }
}

impl LLMConfig {
    /// Provider name as matched everywhere: trimmed and lowercase.
    pub fn provider_key(&self) -> String {
        self.provider.trim().to_lowercase()
    }

    /// Get the model name, falling back to provider defaults.
    pub fn model_or_default(&self) -> String {
        self.model.clone().unwrap_or_else(|| {
            match self.provider_key().as_str() {
                "anthropic" | "claude" => DEFAULT_ANTHROPIC_MODEL.to_string(),
                "ollama" => DEFAULT_OLLAMA_MODEL.to_string(),
                "openai" => DEFAULT_OPENAI_MODEL.to_string(),
                _ => DEFAULT_GEMINI_MODEL.to_string(),
            }
        })
    }

    /// Get the base URL, falling back to provider defaults.
    pub fn base_url_or_default(&self) -> String {
        self.base_url.clone().unwrap_or_else(|| {
            match self.provider_key().as_str() {
                "anthropic" | "claude" => DEFAULT_ANTHROPIC_URL.to_string(),
                "ollama" => DEFAULT_OLLAMA_URL.to_string(),
                "openai" => DEFAULT_OPENAI_URL.to_string(),
                _ => DEFAULT_GEMINI_URL.to_string(),
            }
        })
    }

    /// Get API key from config or environment.
    pub fn api_key_or_env(&self) -> Option<String> {
        self.api_key.clone()
            .or_else(|| std::env::var("RABBITHOLE_LLM_API_KEY").ok())
            .or_else(|| match self.provider_key().as_str() {
                "anthropic" | "claude" => std::env::var("ANTHROPIC_API_KEY").ok(),
                "openai" => std::env::var("OPENAI_API_KEY").ok(),
                "ollama" => None,
                _ => std::env::var("GOOGLE_AI_API_KEY").ok(),
            })
    }
}

/// Web search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Search endpoint URL.
    pub base_url: String,

    /// API key (usually from `TAVILY_API_KEY`).
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Upper bound on results per query.
    pub max_results: u32,

    /// Search depth: "basic" or "advanced".
    pub search_depth: String,

    /// Ask the provider for related images.
    pub include_images: bool,

    /// Ask the provider to describe each image.
    pub include_image_descriptions: bool,

    /// Ask the provider for its own short answer.
    pub include_answer: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SEARCH_URL.to_string(),
            api_key: None,
            max_results: DEFAULT_MAX_RESULTS,
            search_depth: DEFAULT_SEARCH_DEPTH.to_string(),
            include_images: true,
            include_image_descriptions: true,
            include_answer: true,
        }
    }
}

/// Prompt and parsing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// System prompt override. If not set, uses the built-in default.
    pub system_prompt: Option<String>,

    /// Number of follow-up questions requested from the model.
    pub follow_up_count: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            system_prompt: None,
            follow_up_count: DEFAULT_FOLLOW_UP_COUNT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.llm.provider, DEFAULT_LLM_PROVIDER);
        assert_eq!(config.search.max_results, DEFAULT_MAX_RESULTS);
        assert!(config.search.include_images);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[llm]"));
        assert!(toml_str.contains("[search]"));
        assert!(!toml_str.contains("api_key"));
    }

    #[test]
    fn test_validate_rejects_zero_results() {
        let mut config = Config::default();
        config.search.max_results = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_helpers_ignore_provider_case() {
        let config = LLMConfig {
            provider: " OpenAI ".to_string(),
            ..LLMConfig::default()
        };
        assert_eq!(config.provider_key(), "openai");
        assert_eq!(config.base_url_or_default(), DEFAULT_OPENAI_URL);
        assert_eq!(config.model_or_default(), DEFAULT_OPENAI_MODEL);
    }

    #[test]
    fn test_base_url_or_default() {
        let mut config = LLMConfig::default();
        assert_eq!(config.base_url_or_default(), DEFAULT_GEMINI_URL);

        config.provider = "ollama".to_string();
        assert_eq!(config.base_url_or_default(), DEFAULT_OLLAMA_URL);

        config.base_url = Some("http://proxy.local/v1".to_string());
        assert_eq!(config.base_url_or_default(), "http://proxy.local/v1");
    }
}
