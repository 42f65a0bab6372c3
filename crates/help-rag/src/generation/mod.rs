//! Answer generation with Ollama

pub mod ollama;
pub mod prompt;

pub use ollama::{GenerationSettings, OllamaClient, StreamAccumulator};
pub use prompt::PromptBuilder;
