mod error;
mod claude;
mod openai;
mod provider;

pub use error::LLMError;
pub use claude::ClaudeClient;
pub use openai::OpenAIClient;
pub use provider::Provider;

use async_trait::async_trait;

/// Trait for Large Language Model providers.
///
/// The query service only needs "prompt in, text out", so every provider
/// is reduced to this capability and picked once at startup.
///
/// # Supported Providers
///
/// - **Gemini** (default): Google's OpenAI-compatible endpoint
/// - **OpenAI-compatible**: OpenAI, Azure, vLLM, OpenRouter, etc.
/// - **Anthropic**: Claude models via the Messages API
/// - **Ollama**: Local models via Ollama
///
/// # Example
///
/// ```ignore
/// use rabbithole_core::llm::{Provider, LLM};
///
/// let llm = Provider::from_config(&config.llm).build()?;
/// let response = llm.complete_with_system("Be brief.", "Hello!").await?;
/// ```
#[async_trait]
pub trait LLM: Send + Sync {
    /// Complete a prompt and return the response.
    async fn complete(&self, prompt: &str) -> Result<String, LLMError>;

    /// Complete a prompt with a system message.
    async fn complete_with_system(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<String, LLMError>;

    /// Model identifier, used in logs.
    fn model_name(&self) -> &str;
}

/// Blanket implementation for boxed trait objects.
#[async_trait]
impl LLM for Box<dyn LLM> {
    async fn complete(&self, prompt: &str) -> Result<String, LLMError> {
        (**self).complete(prompt).await
    }

    async fn complete_with_system(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<String, LLMError> {
        (**self).complete_with_system(system, prompt).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
