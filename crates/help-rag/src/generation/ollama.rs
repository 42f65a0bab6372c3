//! Ollama HTTP client for embeddings, generation and chat

use futures_util::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::types::ChatMessage;

/// Per-call generation settings
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    /// Model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Ask Ollama for NDJSON streaming output
    pub stream: bool,
}

impl From<&LlmConfig> for GenerationSettings {
    fn from(config: &LlmConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            stream: config.stream,
        }
    }
}

/// Ollama API client
pub struct OllamaClient {
    /// HTTP client
    client: Client,
    /// Base URL, without trailing slash
    base_url: String,
}

#[derive(Serialize)]
struct Options {
    temperature: f32,
    num_predict: u32,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: Options,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: Options,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if Ollama is available
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Generate an embedding
    pub async fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let request = EmbedRequest { model, prompt: text };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::embedding(format!("Embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::embedding(format!("Embedding failed: HTTP {} - {}", status, body)));
        }

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("Failed to parse embedding response: {}", e)))?;

        if embed_response.embedding.is_empty() {
            return Err(Error::embedding(format!("Model '{}' returned an empty embedding", model)));
        }

        Ok(embed_response.embedding)
    }

    /// Complete a single prompt
    pub async fn generate(&self, settings: &GenerationSettings, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model: &settings.model,
            prompt,
            stream: settings.stream,
            options: Options {
                temperature: settings.temperature,
                num_predict: settings.max_tokens,
            },
        };

        tracing::debug!("Generating with model {} (stream: {})", settings.model, settings.stream);

        let response = self.post(&url, &request, "Generation").await?;

        if settings.stream {
            return collect_stream(response).await;
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::llm(format!("Failed to parse generation response: {}", e)))?;
        Ok(body.response)
    }

    /// Continue a conversation
    pub async fn chat(
        &self,
        settings: &GenerationSettings,
        messages: &[ChatMessage],
    ) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);
        let request = ChatRequest {
            model: &settings.model,
            messages,
            stream: settings.stream,
            options: Options {
                temperature: settings.temperature,
                num_predict: settings.max_tokens,
            },
        };

        tracing::debug!("Chatting with model {} over {} messages", settings.model, messages.len());

        let response = self.post(&url, &request, "Chat").await?;

        if settings.stream {
            return collect_stream(response).await;
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::llm(format!("Failed to parse chat response: {}", e)))?;
        Ok(body.message.content)
    }

    /// POST a JSON body and turn transport failures and non-2xx statuses into LLM errors
    async fn post<T: Serialize>(
        &self,
        url: &str,
        body: &T,
        what: &str,
    ) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::llm(format!("{} request failed: {}", what, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::llm(format!("{} failed: HTTP {} - {}", what, status, body)));
        }

        Ok(response)
    }
}

/// One NDJSON line of a streamed generate or chat response
#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    message: Option<ChatMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Reassembles NDJSON lines split across network frames
#[derive(Default)]
pub struct StreamAccumulator {
    buffer: Vec<u8>,
    output: String,
    done: bool,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes; returns true once the final chunk has been seen
    pub fn push(&mut self, bytes: &[u8]) -> Result<bool> {
        self.buffer.extend_from_slice(bytes);

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.apply_line(&line)?;
            if self.done {
                break;
            }
        }

        Ok(self.done)
    }

    /// Flush any trailing line and return the concatenated text.
    ///
    /// Fails if the final `done` chunk never arrived.
    pub fn finish(mut self) -> Result<String> {
        if !self.done && !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.apply_line(&line)?;
        }
        if !self.done {
            return Err(Error::llm("stream ended before completion"));
        }
        Ok(self.output)
    }

    fn apply_line(&mut self, line: &[u8]) -> Result<()> {
        let text = std::str::from_utf8(line)
            .map_err(|e| Error::llm(format!("Stream produced invalid UTF-8: {}", e)))?
            .trim();
        if text.is_empty() {
            return Ok(());
        }

        let chunk: StreamChunk = serde_json::from_str(text)
            .map_err(|e| Error::llm(format!("Failed to parse stream chunk: {}", e)))?;

        if let Some(error) = chunk.error {
            return Err(Error::llm(error));
        }
        if let Some(response) = chunk.response {
            self.output.push_str(&response);
        }
        if let Some(message) = chunk.message {
            self.output.push_str(&message.content);
        }
        self.done = chunk.done;

        Ok(())
    }
}

/// Drain a streamed response into a single string
async fn collect_stream(response: reqwest::Response) -> Result<String> {
    let mut stream = response.bytes_stream();
    let mut acc = StreamAccumulator::new();

    while let Some(frame) = stream.next().await {
        let bytes = frame.map_err(|e| Error::llm(format!("Stream error: {}", e)))?;
        if acc.push(&bytes)? {
            break;
        }
    }

    acc.finish()
}
