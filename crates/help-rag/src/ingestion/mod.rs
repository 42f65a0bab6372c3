//! Document ingestion: source loading and chunking

mod chunker;
mod loader;

pub use chunker::TextChunker;
pub use loader::{hash_content, is_pdf_path, LoadedSource, SourceLoader};
