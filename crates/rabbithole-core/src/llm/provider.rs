use crate::config::{LLMConfig, DEFAULT_OLLAMA_MODEL};
use super::{ClaudeClient, LLMError, OpenAIClient, LLM};

/// LLM Provider configuration.
///
/// Resolved once from [`LLMConfig`] at startup; [`Provider::build`] turns it
/// into the client the query service holds for its whole lifetime.
#[derive(Debug, Clone)]
pub enum Provider {
    /// Google Gemini through its OpenAI-compatible endpoint (default)
    Gemini {
        base_url: String,
        api_key: Option<String>,
        model: String,
        max_tokens: u32,
    },
    /// OpenAI or any OpenAI-compatible endpoint
    OpenAI {
        base_url: String,
        api_key: Option<String>,
        model: String,
        max_tokens: u32,
    },
    /// Anthropic Claude
    Anthropic {
        base_url: String,
        api_key: Option<String>,
        model: String,
        api_version: Option<String>,
        max_tokens: u32,
    },
    /// Local Ollama instance
    Ollama {
        base_url: String,
        model: String,
        max_tokens: u32,
    },
}

impl Provider {
    /// Creates a provider from LLMConfig, resolving keys from the environment.
    pub fn from_config(config: &LLMConfig) -> Result<Self, LLMError> {
        let model = config.model_or_default();
        let max_tokens = config.max_tokens;

        let provider = match config.provider_key().as_str() {
            "gemini" | "google" => Provider::Gemini {
                base_url: config.base_url_or_default(),
                api_key: config.api_key_or_env(),
                model,
                max_tokens,
            },
            "openai" | "openai-compatible" => Provider::OpenAI {
                base_url: config.base_url_or_default(),
                api_key: config.api_key_or_env(),
                model,
                max_tokens,
            },
            "anthropic" | "claude" => Provider::Anthropic {
                base_url: config.base_url_or_default(),
                api_key: config.api_key_or_env(),
                model,
                api_version: config.api_version.clone(),
                max_tokens,
            },
            "ollama" => {
                let base_url = match (&config.base_url, std::env::var("OLLAMA_HOST").ok()) {
                    (Some(url), _) => url.clone(),
                    (None, Some(host)) => format!("{}/v1", host.trim_end_matches('/')),
                    (None, None) => config.base_url_or_default(),
                };
                Provider::Ollama {
                    base_url,
                    model: config.model.clone().unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
                    max_tokens,
                }
            }
            other => return Err(LLMError::UnknownProvider(other.to_string())),
        };

        Ok(provider)
    }

    /// Short provider name, used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Gemini { .. } => "gemini",
            Provider::OpenAI { .. } => "openai",
            Provider::Anthropic { .. } => "anthropic",
            Provider::Ollama { .. } => "ollama",
        }
    }

    /// Creates an LLM client from the provider configuration.
    ///
    /// Keyed providers fail with [`LLMError::MissingApiKey`] when no key was
    /// found; callers treat that as fatal at startup.
    pub fn build(self) -> Result<Box<dyn LLM>, LLMError> {
        let name = self.name();
        match self {
            Provider::Gemini { base_url, api_key, model, max_tokens }
            | Provider::OpenAI { base_url, api_key, model, max_tokens } => {
                let key = api_key
                    .filter(|k| !k.is_empty())
                    .ok_or_else(|| LLMError::MissingApiKey(name.to_string()))?;

                Ok(Box::new(
                    OpenAIClient::new(base_url, key, model).with_max_tokens(max_tokens),
                ))
            }

            Provider::Anthropic { base_url, api_key, model, api_version, max_tokens } => {
                let key = api_key
                    .filter(|k| !k.is_empty())
                    .ok_or_else(|| LLMError::MissingApiKey(name.to_string()))?;

                let mut client = ClaudeClient::new(key)
                    .with_model(model)
                    .with_api_url(base_url)
                    .with_max_tokens(max_tokens);
                if let Some(version) = api_version {
                    client = client.with_api_version(version);
                }

                Ok(Box::new(client))
            }

            Provider::Ollama { base_url, model, max_tokens } => {
                Ok(Box::new(
                    OpenAIClient::new(base_url, "", model).with_max_tokens(max_tokens),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_URL};

    fn config(provider: &str, api_key: Option<&str>) -> LLMConfig {
        LLMConfig {
            provider: provider.to_string(),
            api_key: api_key.map(str::to_string),
            ..LLMConfig::default()
        }
    }

    #[test]
    fn test_default_provider_is_gemini() {
        let provider = Provider::from_config(&config("gemini", Some("k"))).unwrap();
        match provider {
            Provider::Gemini { base_url, model, .. } => {
                assert_eq!(base_url, DEFAULT_GEMINI_URL);
                assert_eq!(model, DEFAULT_GEMINI_MODEL);
            }
            other => panic!("unexpected provider {other:?}"),
        }
    }

    #[test]
    fn test_ollama_provider_build() {
        let provider = Provider::Ollama {
            base_url: "http://localhost:11434/v1".to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            max_tokens: 1024,
        };
        // Should succeed without API key
        assert!(provider.build().is_ok());
    }

    #[test]
    fn test_missing_key_is_fatal() {
        let provider = Provider::Gemini {
            base_url: DEFAULT_GEMINI_URL.to_string(),
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            max_tokens: 1024,
        };
        assert!(matches!(provider.build(), Err(LLMError::MissingApiKey(name)) if name == "gemini"));
    }

    #[test]
    fn test_unknown_provider() {
        let result = Provider::from_config(&config("carrier-pigeon", None));
        assert!(matches!(result, Err(LLMError::UnknownProvider(_))));
    }

    #[test]
    fn test_anthropic_build_with_key() {
        let provider = Provider::from_config(&config("claude", Some("sk-test"))).unwrap();
        assert_eq!(provider.name(), "anthropic");
        let llm = provider.build().unwrap();
        assert_eq!(llm.model_name(), crate::config::DEFAULT_ANTHROPIC_MODEL);
    }
}
