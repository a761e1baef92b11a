use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{SearchError, SearchOptions, SearchProvider, SearchResults};
use crate::config::{SearchConfig, DEFAULT_SEARCH_URL};

/// Tavily search API client.
pub struct TavilyClient {
    api_key: String,
    api_url: String,
    client: Client,
}

impl TavilyClient {
    /// Creates a new Tavily client with the given API key.
    ///
    /// An empty key is accepted here and reported on the first search,
    /// so a server can start without search configured.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_SEARCH_URL.to_string(),
            client: Client::new(),
        }
    }

    /// Creates a client from search configuration.
    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.api_key.clone().unwrap_or_default())
            .with_api_url(&config.base_url)
    }

    /// Sets the API URL (for proxies or self-hosted gateways).
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<SearchResults, SearchError> {
        if self.api_key.is_empty() {
            return Err(SearchError::MissingApiKey);
        }

        let request = TavilyRequest {
            api_key: &self.api_key,
            query,
            search_depth: &options.search_depth,
            max_results: options.max_results,
            include_images: options.include_images,
            include_image_descriptions: options.include_image_descriptions,
            include_answer: options.include_answer,
        };

        tracing::debug!(url = %self.api_url, query = %query, max_results = options.max_results, "sending search request");

        let response = self
            .client
            .post(&self.api_url)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if status == 429 {
            return Err(SearchError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SearchError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let results: SearchResults = response
            .json()
            .await
            .map_err(|e| SearchError::ParseError(e.to_string()))?;

        tracing::debug!(results = results.results.len(), images = results.images.len(), "search complete");

        Ok(results)
    }
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'a str,
    max_results: u32,
    include_images: bool,
    include_image_descriptions: bool,
    include_answer: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_key_fails_before_network() {
        let client = TavilyClient::new("").with_api_url("http://127.0.0.1:9/unreachable");
        let result = client.search("anything", &SearchOptions::default()).await;
        assert!(matches!(result, Err(SearchError::MissingApiKey)));
    }

    #[test]
    fn test_from_config_uses_base_url() {
        let config = SearchConfig {
            base_url: "http://search.local/search".to_string(),
            api_key: Some("tvly-test".to_string()),
            ..SearchConfig::default()
        };
        let client = TavilyClient::from_config(&config);
        assert_eq!(client.api_url, "http://search.local/search");
        assert_eq!(client.api_key, "tvly-test");
    }

    #[test]
    fn test_request_shape() {
        let options = SearchOptions::default();
        let request = TavilyRequest {
            api_key: "k",
            query: "octopus cognition",
            search_depth: &options.search_depth,
            max_results: options.max_results,
            include_images: options.include_images,
            include_image_descriptions: options.include_image_descriptions,
            include_answer: options.include_answer,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["search_depth"], "basic");
        assert_eq!(json["max_results"], 5);
        assert_eq!(json["include_images"], true);
    }
}
