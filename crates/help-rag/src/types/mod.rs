//! Core types for the RAG gateway

pub mod chat;
pub mod document;
pub mod response;

pub use chat::{ChatMessage, ChatTurn, Role};
pub use document::{Chunk, ChunkSource, DataType, Document};
pub use response::{AddResponse, AnswerResponse};
