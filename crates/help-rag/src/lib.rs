//! help-rag: HTTP gateway over a retrieval-augmented-generation session
//!
//! Exposes three routes (`/add`, `/query`, `/chat`) over one long-lived
//! [`session::RetrievalSession`]. The bundled [`session::RagSession`] ingests
//! PDFs, embeds chunks with Ollama, keeps them in a local vector store, and
//! answers with an Ollama-hosted model.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod server;
pub mod session;
pub mod types;

pub use config::GatewayConfig;
pub use error::{ApiError, Error, Result};
pub use server::{build_router, state::AppState, GatewayServer};
pub use session::{RagSession, RetrievalSession};
pub use types::{DataType, Document};
