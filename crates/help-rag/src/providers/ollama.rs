//! Ollama-based providers for embeddings and LLM
//!
//! Wraps `OllamaClient` to implement the provider traits.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{EmbedderConfig, LlmConfig};
use crate::error::Result;
use crate::generation::{GenerationSettings, OllamaClient};
use crate::types::ChatMessage;

use super::embedding::EmbeddingProvider;
use super::llm::LlmProvider;

/// Ollama embedding provider
pub struct OllamaEmbedder {
    client: Arc<OllamaClient>,
    model: String,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedder with its own client
    pub fn new(config: &EmbedderConfig, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: Arc::new(OllamaClient::new(&config.base_url, timeout_secs)?),
            model: config.model.clone(),
        })
    }

    /// Create from existing OllamaClient
    pub fn from_client(client: Arc<OllamaClient>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embed(&self.model, text).await
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// Ollama LLM provider for generation and chat
pub struct OllamaLlm {
    client: Arc<OllamaClient>,
    settings: GenerationSettings,
}

impl OllamaLlm {
    /// Create a new Ollama LLM provider with its own client
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            client: Arc::new(OllamaClient::new(&config.base_url, config.timeout_secs)?),
            settings: GenerationSettings::from(config),
        })
    }

    /// Get the underlying client
    pub fn client(&self) -> &Arc<OllamaClient> {
        &self.client
    }
}

#[async_trait]
impl LlmProvider for OllamaLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.client.generate(&self.settings, prompt).await
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        self.client.chat(&self.settings, messages).await
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.settings.model
    }
}

/// Build the embedder and LLM, sharing one HTTP client when both point at the same Ollama
pub fn build_providers(
    llm: &LlmConfig,
    embedder: &EmbedderConfig,
) -> Result<(OllamaEmbedder, OllamaLlm)> {
    let llm_provider = OllamaLlm::new(llm)?;

    let same_host = embedder.base_url.trim_end_matches('/') == llm_provider.client().base_url();
    let embedder_provider = if same_host {
        OllamaEmbedder::from_client(Arc::clone(llm_provider.client()), embedder.model.clone())
    } else {
        OllamaEmbedder::new(embedder, llm.timeout_secs)?
    };

    Ok((embedder_provider, llm_provider))
}
