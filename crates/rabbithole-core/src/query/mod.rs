//! Query answering: one search-grounded model call per request.

mod parse;
mod prompts;
mod service;
mod types;

pub use parse::{parse_model_output, strip_item_tags, ParseAnomaly, ParsedAnswer};
pub use prompts::{build_context_block, build_system_prompt, build_user_prompt};
pub use service::{QueryError, QueryService};
pub use types::{
    ConversationTurn, ErrorBody, FollowUpMode, ImageReference, QueryResponse, SearchRequest, SourceCitation,
};
