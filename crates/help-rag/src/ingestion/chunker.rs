//! Sentence-aware text chunking

use unicode_segmentation::UnicodeSegmentation;
use uuid::Uuid;

use crate::config::ChunkingConfig;
use crate::types::{Chunk, ChunkSource};

/// Text chunker with configurable size and overlap
pub struct TextChunker {
    /// Target chunk size in characters
    chunk_size: usize,
    /// Overlap between chunks
    overlap: usize,
    /// Minimum chunk size
    min_size: usize,
}

impl TextChunker {
    /// Create a new chunker
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size,
            overlap,
            min_size: 50,
        }
    }

    /// Create a chunker from configuration
    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap).with_min_size(config.min_chunk_size)
    }

    /// Override the minimum chunk size
    pub fn with_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }

    /// Split `text` into chunks belonging to `document_id`
    pub fn chunk(&self, document_id: Uuid, text: &str, source: &ChunkSource) -> Vec<Chunk> {
        let mut pieces = Vec::new();
        let mut current_chunk = String::new();

        for sentence in text.split_sentence_bounds() {
            // If adding this sentence exceeds chunk size, save current chunk
            if !current_chunk.trim().is_empty()
                && current_chunk.len() + sentence.len() > self.chunk_size
            {
                if current_chunk.trim().len() >= self.min_size {
                    pieces.push(current_chunk.trim().to_string());
                }

                // Start new chunk with overlap
                current_chunk = self.get_overlap_text(&current_chunk);
            }

            current_chunk.push_str(sentence);
        }

        // Save final chunk
        let last = current_chunk.trim();
        if last.len() >= self.min_size || (pieces.is_empty() && !last.is_empty()) {
            pieces.push(last.to_string());
        }

        pieces
            .into_iter()
            .enumerate()
            .map(|(i, content)| Chunk::new(document_id, content, source.clone(), i as u32))
            .collect()
    }

    /// Get overlap text from the end of a chunk
    fn get_overlap_text(&self, text: &str) -> String {
        if self.overlap == 0 {
            return String::new();
        }
        if text.len() <= self.overlap {
            return text.to_string();
        }

        let mut start = text.len() - self.overlap;

        // Ensure we're at a valid UTF-8 character boundary
        while start > 0 && !text.is_char_boundary(start) {
            start -= 1;
        }

        let overlap_text = &text[start..];

        // Try to start at a sentence boundary
        if let Some(pos) = overlap_text.find(". ") {
            let rest = &overlap_text[pos + 2..];
            if !rest.trim().is_empty() {
                return rest.to_string();
            }
        }

        // Fall back to word boundary
        if let Some(pos) = overlap_text.find(' ') {
            return overlap_text[pos + 1..].to_string();
        }

        overlap_text.to_string()
    }
}
