//! Retrieval session backed by the provider traits

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use crate::config::{GatewayConfig, RetrievalConfig};
use crate::error::Result;
use crate::generation::PromptBuilder;
use crate::ingestion::{is_pdf_path, SourceLoader, TextChunker};
use crate::providers::{
    local::LocalVectorStore, ollama::build_providers, EmbeddingProvider, LlmProvider,
    VectorStoreProvider,
};
use crate::types::{ChatMessage, ChatTurn, ChunkSource, DataType, Document};

use super::{ChatMemory, RetrievalSession};

/// RAG session: chunk, embed, retrieve, generate
pub struct RagSession {
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    store: Arc<dyn VectorStoreProvider>,
    chunker: TextChunker,
    retrieval: RetrievalConfig,
    memory: ChatMemory,
    /// Ingested documents keyed by content hash
    documents: DashMap<String, Document>,
}

impl RagSession {
    /// Build a session with Ollama providers and a local vector store
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        let (embedder, llm) = build_providers(&config.llm, &config.embedder)?;
        tracing::info!(
            "Ollama providers initialized (llm: {} @ {}, embedder: {} @ {})",
            config.llm.model,
            config.llm.base_url,
            config.embedder.model,
            config.embedder.base_url
        );

        let store = LocalVectorStore::open(config.vectordb.dir.as_deref())?;
        tracing::info!("Vector store initialized at {}", store.path().display());

        Ok(Self::with_providers(
            config,
            Arc::new(embedder),
            Arc::new(llm),
            Arc::new(store),
        ))
    }

    /// Build a session from explicit providers
    pub fn with_providers(
        config: &GatewayConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        store: Arc<dyn VectorStoreProvider>,
    ) -> Self {
        tracing::info!(
            "Session providers: embedder={}, llm={} ({}), vector store={}",
            embedder.name(),
            llm.name(),
            llm.model(),
            store.name()
        );

        Self {
            embedder,
            llm,
            store,
            chunker: TextChunker::from_config(&config.chunking),
            retrieval: config.retrieval.clone(),
            memory: ChatMemory::new(config.retrieval.history_window),
            documents: DashMap::new(),
        }
    }

    /// Chat history store
    pub fn memory(&self) -> &ChatMemory {
        &self.memory
    }

    /// All ingested documents
    pub fn documents(&self) -> Vec<Document> {
        self.documents.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Probe every provider; returns (embedder, llm, vector store) health
    pub async fn health_check(&self) -> (bool, bool, bool) {
        let embedder = self.embedder.health_check().await.unwrap_or(false);
        let llm = self.llm.health_check().await.unwrap_or(false);
        let store = self.store.health_check().await.unwrap_or(false);
        (embedder, llm, store)
    }

    /// Retrieve the context block for a piece of text
    async fn retrieve_context(&self, text: &str) -> Result<String> {
        if self.store.is_empty().await? {
            return Ok(String::new());
        }

        let embedding = self.embedder.embed(text).await?;
        let results = self.store.search(&embedding, self.retrieval.top_k).await?;
        tracing::debug!("Retrieved {} chunks", results.len());

        Ok(PromptBuilder::build_context(&results))
    }
}

#[async_trait]
impl RetrievalSession for RagSession {
    async fn add(&self, source: &str, data_type: DataType) -> Result<()> {
        if data_type == DataType::PdfFile && !is_pdf_path(source) {
            tracing::warn!("Ingesting {} as {} without a .pdf extension", source, data_type);
        }

        let loaded = SourceLoader::load(source, data_type).await?;

        if let Some(existing) = self.documents.get(&loaded.content_hash) {
            tracing::info!(
                "Skipping {}: identical content already ingested as document {} at {}",
                existing.label(),
                existing.id,
                existing.ingested_at.to_rfc3339()
            );
            return Ok(());
        }

        let mut document =
            Document::new(source.to_string(), data_type, loaded.content_hash.clone());
        let chunk_source = ChunkSource {
            label: document.label(),
            data_type,
        };

        let mut chunks = self.chunker.chunk(document.id, &loaded.content, &chunk_source);
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = embedding;
        }

        self.store.insert_chunks(&chunks).await?;

        document.total_chunks = chunks.len() as u32;
        tracing::info!(
            "Added {} ({}) as document {} with {} chunks",
            document.label(),
            data_type,
            document.id,
            document.total_chunks
        );
        self.documents.insert(loaded.content_hash, document);

        Ok(())
    }

    async fn query(&self, question: &str) -> Result<String> {
        let context = self.retrieve_context(question).await?;
        let prompt = PromptBuilder::build_query_prompt(question, &context);

        tracing::info!("Query with model {}: \"{}\"", self.llm.model(), question);
        let answer = self.llm.generate(&prompt).await?;

        Ok(answer.trim().to_string())
    }

    async fn chat(&self, message: &str, session_id: &str) -> Result<String> {
        let context = self.retrieve_context(message).await?;
        let history = self.memory.history(session_id);

        let mut messages = Vec::with_capacity(history.len() * 2 + 2);
        messages.push(ChatMessage::system(PromptBuilder::build_chat_system_prompt(&context)));
        for turn in &history {
            messages.extend(turn.to_messages());
        }
        messages.push(ChatMessage::user(message));

        tracing::info!(
            "Chat for session {} with {} prior turns",
            session_id,
            history.len()
        );
        let reply = self.llm.chat(&messages).await?;
        let reply = reply.trim().to_string();

        self.memory.record(session_id, ChatTurn::new(message, reply.clone()));

        Ok(reply)
    }
}
