//! Web search used to ground model answers.
//!
//! The provider is a collaborator used as-is: results and images are passed
//! through to the prompt and the response without re-ranking.

mod error;
mod tavily;

pub use error::SearchError;
pub use tavily::TavilyClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;

/// Per-request search options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// "basic" or "advanced".
    pub search_depth: String,
    /// Upper bound on returned results.
    pub max_results: u32,
    pub include_images: bool,
    pub include_image_descriptions: bool,
    pub include_answer: bool,
}

impl From<&SearchConfig> for SearchOptions {
    fn from(config: &SearchConfig) -> Self {
        Self {
            search_depth: config.search_depth.clone(),
            max_results: config.max_results,
            include_images: config.include_images,
            include_image_descriptions: config.include_image_descriptions,
            include_answer: config.include_answer,
        }
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

/// Everything the provider returned for one query.
///
/// Serialized verbatim into the user prompt, so field names follow the
/// provider's own JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default)]
    pub results: Vec<SearchHit>,
    #[serde(default)]
    pub images: Vec<SearchImage>,
}

/// A single web result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// An image result.
///
/// Without image descriptions the provider returns bare url strings;
/// with them it returns objects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SearchImage {
    Url(String),
    Described {
        url: String,
        #[serde(default)]
        description: Option<String>,
    },
}

impl SearchImage {
    pub fn url(&self) -> &str {
        match self {
            SearchImage::Url(url) => url,
            SearchImage::Described { url, .. } => url,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            SearchImage::Url(_) => None,
            SearchImage::Described { description, .. } => description.as_deref(),
        }
    }
}

/// Trait for web search providers.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run one search. No retries.
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<SearchResults, SearchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_images_accept_strings_and_objects() {
        let raw = r#"{
            "query": "q",
            "results": [],
            "images": [
                "https://img.example/a.png",
                {"url": "https://img.example/b.png", "description": "a b"}
            ]
        }"#;
        let parsed: SearchResults = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.images.len(), 2);
        assert_eq!(parsed.images[0].url(), "https://img.example/a.png");
        assert_eq!(parsed.images[0].description(), None);
        assert_eq!(parsed.images[1].description(), Some("a b"));
    }

    #[test]
    fn test_missing_collections_default_to_empty() {
        let parsed: SearchResults = serde_json::from_str(r#"{"query":"q"}"#).unwrap();
        assert!(parsed.results.is_empty());
        assert!(parsed.images.is_empty());
    }

    #[test]
    fn test_options_from_config() {
        let config = SearchConfig {
            max_results: 8,
            include_images: false,
            ..SearchConfig::default()
        };
        let options = SearchOptions::from(&config);
        assert_eq!(options.max_results, 8);
        assert!(!options.include_images);
        assert_eq!(options.search_depth, "basic");
    }
}
