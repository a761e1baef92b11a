use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::query::{ErrorBody, QueryError, QueryResponse, QueryService, SearchRequest};

/// Errors seen by the exploration client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request was aborted; not a failure.
    #[error("Request cancelled")]
    Cancelled,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error(transparent)]
    Service(#[from] QueryError),
}

impl ClientError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Http(err.to_string())
        }
    }
}

/// Anything that can answer a [`SearchRequest`].
#[async_trait]
pub trait QueryClient: Send + Sync {
    async fn query(&self, request: &SearchRequest) -> Result<QueryResponse, ClientError>;
}

#[async_trait]
impl QueryClient for QueryService {
    async fn query(&self, request: &SearchRequest) -> Result<QueryResponse, ClientError> {
        Ok(self.handle(request).await?)
    }
}

#[async_trait]
impl<T: QueryClient + ?Sized> QueryClient for std::sync::Arc<T> {
    async fn query(&self, request: &SearchRequest) -> Result<QueryResponse, ClientError> {
        (**self).query(request).await
    }
}

/// Talks to a running `rabbithole serve` instance.
pub struct HttpQueryClient {
    base_url: String,
    client: Client,
}

impl HttpQueryClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Checks `GET /api/health`.
    pub async fn health(&self) -> Result<(), ClientError> {
        let url = format!("{}/api/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Server {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl QueryClient for HttpQueryClient {
    async fn query(&self, request: &SearchRequest) -> Result<QueryResponse, ClientError> {
        let url = format!("{}/api/rabbitholes/search", self.base_url);
        tracing::debug!(url = %url, query = %request.query, "posting search request");

        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => match body.details {
                    Some(details) => format!("{}: {}", body.error, details),
                    None => body.error,
                },
                Err(_) => text,
            };
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<QueryResponse>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}
