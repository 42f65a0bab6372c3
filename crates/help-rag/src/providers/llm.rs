//! LLM provider trait for answer generation

use async_trait::async_trait;
use crate::error::Result;
use crate::types::ChatMessage;

/// Trait for LLM-based generation
///
/// Implementations:
/// - `OllamaLlm`: Local Ollama server (tinyllama, llama3, etc.)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Complete a single prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Continue a conversation and return the assistant reply
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
