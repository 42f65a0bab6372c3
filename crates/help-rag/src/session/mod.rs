//! Retrieval session: the object the HTTP gateway delegates to

mod memory;
mod rag;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::DataType;

pub use memory::ChatMemory;
pub use rag::RagSession;

/// A long-lived RAG session shared by every request in the process
#[async_trait]
pub trait RetrievalSession: Send + Sync {
    /// Ingest a source of the given data type
    async fn add(&self, source: &str, data_type: DataType) -> Result<()>;

    /// Answer a one-shot question against the ingested documents
    async fn query(&self, question: &str) -> Result<String>;

    /// Reply to a chat message, carrying history forward under `session_id`
    async fn chat(&self, message: &str, session_id: &str) -> Result<String>;
}
