use std::io::Write;

use rabbithole_core::config::{
    DEFAULT_ANTHROPIC_MODEL, DEFAULT_FOLLOW_UP_COUNT, DEFAULT_GEMINI_MODEL, DEFAULT_LLM_PROVIDER,
    DEFAULT_OLLAMA_MODEL, DEFAULT_OPENAI_MODEL, DEFAULT_SEARCH_DEPTH,
};
use rabbithole_core::{Config, ConfigError, LLMConfig};

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.llm.provider, DEFAULT_LLM_PROVIDER);
    assert_eq!(config.search.search_depth, DEFAULT_SEARCH_DEPTH);
    assert_eq!(config.query.follow_up_count, DEFAULT_FOLLOW_UP_COUNT);
    assert!(config.query.system_prompt.is_none());
}

#[test]
fn test_config_to_toml() {
    let toml_str = Config::default_config_string();
    assert!(toml_str.contains("[server]"));
    assert!(toml_str.contains("[llm]"));
    assert!(toml_str.contains("[search]"));
    assert!(toml_str.contains("[query]"));
}

#[test]
fn test_config_from_toml() {
    let toml_str = r#"
[llm]
provider = "ollama"
model = "llama3.1"

[search]
search_depth = "advanced"
include_images = false

[query]
follow_up_count = 5
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.llm.provider, "ollama");
    assert_eq!(config.llm.model, Some("llama3.1".to_string()));
    assert_eq!(config.search.search_depth, "advanced");
    assert!(!config.search.include_images);
    assert_eq!(config.query.follow_up_count, 5);
}

#[test]
fn test_partial_config_keeps_defaults() {
    let config: Config = toml::from_str("[llm]\nprovider = \"anthropic\"\n").unwrap();
    assert_eq!(config.llm.provider, "anthropic");
    assert!(config.search.include_answer);
    assert_eq!(config.query.follow_up_count, DEFAULT_FOLLOW_UP_COUNT);
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[search]\nsearch_depth = \"advanced\"\n\n[query]\nfollow_up_count = 4").unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.search.search_depth, "advanced");
    assert_eq!(config.query.follow_up_count, 4);
}

#[test]
fn test_from_file_rejects_zero_follow_ups() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[query]\nfollow_up_count = 0").unwrap();

    let result = Config::from_file(file.path());
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_from_file_bad_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[query\nfollow_up_count = ").unwrap();

    let result = Config::from_file(file.path());
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn test_from_missing_file() {
    let result = Config::from_file("/definitely/not/here/rabbithole.toml");
    assert!(matches!(result, Err(ConfigError::ReadError(_))));
}

#[test]
fn test_model_defaults_per_provider() {
    let mut config = LLMConfig::default();
    assert_eq!(config.model_or_default(), DEFAULT_GEMINI_MODEL);

    config.provider = "anthropic".to_string();
    assert_eq!(config.model_or_default(), DEFAULT_ANTHROPIC_MODEL);

    config.provider = "openai".to_string();
    assert_eq!(config.model_or_default(), DEFAULT_OPENAI_MODEL);

    config.provider = "ollama".to_string();
    assert_eq!(config.model_or_default(), DEFAULT_OLLAMA_MODEL);

    config.model = Some("custom".to_string());
    assert_eq!(config.model_or_default(), "custom");
}

#[test]
fn test_explicit_api_key_wins() {
    let config = LLMConfig {
        api_key: Some("from-config".to_string()),
        ..LLMConfig::default()
    };
    assert_eq!(config.api_key_or_env(), Some("from-config".to_string()));
}
