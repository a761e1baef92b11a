use thiserror::Error;

/// Errors that can occur while calling the web search provider.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Missing search API key. Set TAVILY_API_KEY.")]
    MissingApiKey,

    #[error("Search API returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse search response: {0}")]
    ParseError(String),

    #[error("Rate limited by search provider. Try again later.")]
    RateLimited,

    #[error("Network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        SearchError::Network(err.to_string())
    }
}
