//! Document and chunk types with source tracking

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kind of data handed to the retrieval session for ingestion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Path to a PDF file on the local filesystem
    PdfFile,
    /// Raw text, ingested as-is
    Text,
}

impl DataType {
    /// Wire name of the data type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PdfFile => "pdf_file",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document that has been ingested
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID
    pub id: Uuid,
    /// Source as given by the caller (file path or raw text)
    pub source: String,
    /// Data type the source was ingested as
    pub data_type: DataType,
    /// SHA-256 of the extracted text, hex encoded
    pub content_hash: String,
    /// Total number of chunks created
    pub total_chunks: u32,
    /// Ingestion timestamp
    pub ingested_at: chrono::DateTime<chrono::Utc>,
}

impl Document {
    /// Create a new document record
    pub fn new(source: String, data_type: DataType, content_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            data_type,
            content_hash,
            total_chunks: 0,
            ingested_at: chrono::Utc::now(),
        }
    }

    /// Short label used in chunk sources and logs
    pub fn label(&self) -> String {
        match self.data_type {
            DataType::PdfFile => std::path::Path::new(&self.source)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| self.source.clone()),
            DataType::Text => {
                let preview: String = self.source.chars().take(40).collect();
                if preview.len() < self.source.len() {
                    format!("{}...", preview)
                } else {
                    preview
                }
            }
        }
    }
}

/// Source information for a chunk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkSource {
    /// Label of the originating document (file name for PDFs)
    pub label: String,
    /// Data type of the originating document
    pub data_type: DataType,
}

/// A chunk of text from a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk ID
    pub id: Uuid,
    /// Parent document ID
    pub document_id: Uuid,
    /// Text content
    pub content: String,
    /// Embedding vector
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub embedding: Vec<f32>,
    /// Source information
    pub source: ChunkSource,
    /// Chunk index within document
    pub chunk_index: u32,
}

impl Chunk {
    /// Create a new chunk without an embedding
    pub fn new(document_id: Uuid, content: String, source: ChunkSource, chunk_index: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            content,
            embedding: Vec::new(),
            source,
            chunk_index,
        }
    }
}
