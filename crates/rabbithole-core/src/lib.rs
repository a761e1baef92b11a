pub mod config;
pub mod explore;
pub mod llm;
pub mod query;
pub mod search;

pub use config::{Config, ConfigError, LLMConfig, QueryConfig, SearchConfig, ServerConfig};
pub use explore::{ExplorationGraph, HttpQueryClient, QueryClient};
pub use llm::{ClaudeClient, LLMError, OpenAIClient, Provider, LLM};
pub use query::{QueryError, QueryResponse, QueryService, SearchRequest};
pub use search::{SearchError, SearchProvider, TavilyClient};
