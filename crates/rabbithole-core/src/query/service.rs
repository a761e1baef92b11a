use std::sync::Arc;
use thiserror::Error;

use crate::config::{Config, DEFAULT_SYSTEM_PROMPT};
use crate::llm::{LLMError, Provider, LLM};
use crate::search::{SearchError, SearchOptions, SearchProvider, TavilyClient};

use super::parse::parse_model_output;
use super::prompts::{build_context_block, build_system_prompt, build_user_prompt};
use super::types::{ImageReference, QueryResponse, SearchRequest, SourceCitation};

/// Answers one query: web search, prompt, model call, parse.
///
/// Holds no per-request state; concurrent calls share the clients only.
pub struct QueryService {
    llm: Arc<dyn LLM>,
    search: Arc<dyn SearchProvider>,
    options: SearchOptions,
    system_prompt: String,
}

impl QueryService {
    /// Creates a service with default search options and system prompt.
    pub fn new(llm: Arc<dyn LLM>, search: Arc<dyn SearchProvider>) -> Self {
        Self {
            llm,
            search,
            options: SearchOptions::default(),
            system_prompt: build_system_prompt(
                DEFAULT_SYSTEM_PROMPT,
                crate::config::DEFAULT_FOLLOW_UP_COUNT,
            ),
        }
    }

    /// Builds the LLM and search clients described by `config`.
    ///
    /// Fails when the model provider needs a key and none was found.
    pub fn from_config(config: &Config) -> Result<Self, LLMError> {
        let provider = Provider::from_config(&config.llm)?;
        tracing::info!(provider = provider.name(), "initializing model provider");
        let llm: Arc<dyn LLM> = Arc::from(provider.build()?);

        if config.search.api_key.as_deref().unwrap_or_default().is_empty() {
            tracing::warn!("no search API key configured, searches will fail");
        }
        let search: Arc<dyn SearchProvider> = Arc::new(TavilyClient::from_config(&config.search));

        let template = config
            .query
            .system_prompt
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_PROMPT);

        Ok(Self::new(llm, search)
            .with_options(SearchOptions::from(&config.search))
            .with_system_prompt(build_system_prompt(template, config.query.follow_up_count)))
    }

    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the system prompt; no placeholder substitution happens here.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    /// Runs the full pipeline for one request.
    pub async fn handle(&self, request: &SearchRequest) -> Result<QueryResponse, QueryError> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(QueryError::EmptyQuery);
        }

        tracing::info!(
            query = %query,
            history = request.previous_conversation.len(),
            mode = ?request.follow_up_mode,
            "handling query"
        );

        // 1. Search
        let results = self.search.search(query, &self.options).await?;
        tracing::debug!(
            results = results.results.len(),
            images = results.images.len(),
            "search results received"
        );

        // 2. Build prompt
        let context = build_context_block(&request.previous_conversation);
        let search_json = serde_json::to_string_pretty(&results)
            .map_err(|e| QueryError::Search(SearchError::ParseError(e.to_string())))?;
        let prompt = build_user_prompt(
            query,
            &context,
            &search_json,
            request.subject(),
            request.follow_up_mode,
        );

        // 3. Call LLM
        let raw = self
            .llm
            .complete_with_system(&self.system_prompt, &prompt)
            .await?;

        // 4. Parse
        let parsed = parse_model_output(&raw);
        if let Some(anomaly) = parsed.anomaly {
            tracing::warn!(?anomaly, query = %query, "model output did not match the follow-up format");
        }

        let response = QueryResponse {
            response: parsed.body,
            follow_up_questions: parsed.follow_up_questions,
            contextual_query: query.to_string(),
            sources: results.results.iter().map(SourceCitation::from).collect(),
            images: results.images.iter().map(ImageReference::from).collect(),
        };

        tracing::info!(
            follow_ups = response.follow_up_questions.len(),
            sources = response.sources.len(),
            "query answered"
        );

        Ok(response)
    }
}

/// Errors surfaced by [`QueryService::handle`].
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Query must not be empty")]
    EmptyQuery,

    #[error("Search failed: {0}")]
    Search(#[from] SearchError),

    #[error("Model call failed: {0}")]
    Model(#[from] LLMError),
}
