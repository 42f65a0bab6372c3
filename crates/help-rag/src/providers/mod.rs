//! Provider abstractions for embeddings, LLM, and vector storage
//!
//! The retrieval session only talks to these traits, so the Ollama and local
//! implementations can be swapped for fakes in tests.

pub mod embedding;
pub mod llm;
pub mod local;
pub mod ollama;
pub mod vector_store;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use vector_store::{VectorSearchResult, VectorStoreProvider};
