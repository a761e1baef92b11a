//! Default values for rabbithole configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Server Defaults
// ============================================================================

/// Default listen port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default listen address.
pub const DEFAULT_HOST: &str = "127.0.0.1";

// ============================================================================
// LLM Defaults
// ============================================================================

/// Default LLM provider.
pub const DEFAULT_LLM_PROVIDER: &str = "gemini";

/// Default max tokens for LLM responses.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

// Gemini defaults (OpenAI-compatible endpoint)
/// Default Gemini API URL.
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
/// Default Gemini model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

// OpenAI defaults
/// Default OpenAI API URL.
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
/// Default OpenAI model.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

// Anthropic defaults
/// Default Anthropic API URL.
pub const DEFAULT_ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
/// Default Anthropic model.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
/// Default Anthropic API version.
pub const DEFAULT_ANTHROPIC_API_VERSION: &str = "2023-06-01";

// Ollama defaults
/// Default Ollama API URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434/v1";
/// Default Ollama model.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3";

// ============================================================================
// Search Defaults
// ============================================================================

/// Default search provider endpoint (Tavily).
pub const DEFAULT_SEARCH_URL: &str = "https://api.tavily.com/search";

/// Default number of search results requested per query.
pub const DEFAULT_MAX_RESULTS: u32 = 5;

/// Default search depth.
pub const DEFAULT_SEARCH_DEPTH: &str = "basic";

// ============================================================================
// Query Defaults
// ============================================================================

/// Marker that opens the follow-up question section in model output.
pub const FOLLOW_UP_START_MARKER: &str = "<<<FOLLOW_UP_QUESTIONS>>>";

/// Marker that closes the follow-up question section in model output.
pub const FOLLOW_UP_END_MARKER: &str = "<<<END_FOLLOW_UP_QUESTIONS>>>";

/// Number of follow-up questions the model is asked for.
pub const DEFAULT_FOLLOW_UP_COUNT: usize = 3;

/// Placeholder body shown while a node is loading.
pub const LOADING_PLACEHOLDER: &str = "Loading...";

/// Default system prompt for answering a query.
///
/// `{follow_up_count}`, `{start_marker}` and `{end_marker}` are substituted
/// at prompt build time.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are an AI assistant that helps users explore topics in depth. Format your responses using markdown with headers (####).

IMPORTANT FORMATTING RULES:
1. Every technical term, concept, or key phrase in the main response MUST be wrapped in :item[] tags
2. The :item[] tags should wrap EACH OCCURRENCE of the term, not just the first time
3. Format: ":item[term]" - Example: ":item[quantum computing]" (not "quantum :item[computing]")
4. Wrap complete phrases, not partial words
5. Be consistent - if you tag a term once, tag it every time it appears
6. Headers (####) should not be wrapped in :item[] tags
7. Follow-up questions should NOT use :item[] tags - write them in plain text

Your goal is to provide comprehensive, accurate information while maintaining engagement.
Base your response on the search results provided, and structure it clearly with relevant sections.

After your main response, write exactly {follow_up_count} concise follow-up questions that would help users explore the topic further.
Put them between these two marker lines, one question per line:
{start_marker}
First question?
Second question?
{end_marker}
Do not write anything after the closing marker line."#;

// ============================================================================
// Layout Defaults
// ============================================================================

/// Width hint for an answer node.
pub const ANSWER_NODE_WIDTH: f64 = 600.0;
/// Height hint for an answer node.
pub const ANSWER_NODE_HEIGHT: f64 = 500.0;
/// Width hint for a question node.
pub const QUESTION_NODE_WIDTH: f64 = 300.0;
/// Height hint for a question node.
pub const QUESTION_NODE_HEIGHT: f64 = 100.0;
/// Gap between sibling nodes within a rank.
pub const NODE_SEPARATION: f64 = 100.0;
