//! Prompt templates for RAG generation

use crate::providers::vector_store::VectorSearchResult;

/// Prompt builder for RAG queries and chat
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build context from search results
    pub fn build_context(results: &[VectorSearchResult]) -> String {
        let mut context = String::new();

        for (i, result) in results.iter().enumerate() {
            context.push_str(&format!(
                "[{}] {}\n{}\n\n",
                i + 1,
                result.chunk.source.label,
                result.chunk.content
            ));
        }

        context.trim_end().to_string()
    }

    /// Build the one-shot query prompt
    pub fn build_query_prompt(question: &str, context: &str) -> String {
        format!(
            r#"Use the following pieces of context to answer the query at the end.
If you don't know the answer, just say that you don't know, don't try to make up an answer.

{context}

Query: {question}

Helpful Answer:"#,
            context = Self::context_or_placeholder(context),
            question = question
        )
    }

    /// Build the system message for a chat turn
    pub fn build_chat_system_prompt(context: &str) -> String {
        format!(
            r#"You are a helpful assistant. Use the following pieces of context and the conversation so far to answer the user.
If you don't know the answer, just say that you don't know, don't try to make up an answer.

Context:
{context}"#,
            context = Self::context_or_placeholder(context)
        )
    }

    fn context_or_placeholder(context: &str) -> &str {
        if context.trim().is_empty() {
            "(no documents have been added yet)"
        } else {
            context
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chunk, ChunkSource, DataType};
    use uuid::Uuid;

    fn result(label: &str, content: &str) -> VectorSearchResult {
        let source = ChunkSource {
            label: label.to_string(),
            data_type: DataType::PdfFile,
        };
        VectorSearchResult {
            chunk: Chunk::new(Uuid::new_v4(), content.to_string(), source, 0),
            similarity: 0.9,
        }
    }

    #[test]
    fn test_context_numbers_sources() {
        let context = PromptBuilder::build_context(&[
            result("swarm.pdf", "Swarms are decentralized."),
            result("robots.pdf", "Robots follow local rules."),
        ]);
        assert!(context.starts_with("[1] swarm.pdf\nSwarms are decentralized."));
        assert!(context.contains("[2] robots.pdf\nRobots follow local rules."));
    }

    #[test]
    fn test_query_prompt_contains_question_and_context() {
        let prompt = PromptBuilder::build_query_prompt(
            "What is a swarm?",
            "[1] swarm.pdf\nSwarms are groups.",
        );
        assert!(prompt.contains("Query: What is a swarm?"));
        assert!(prompt.contains("Swarms are groups."));
    }

    #[test]
    fn test_empty_context_placeholder() {
        let prompt = PromptBuilder::build_chat_system_prompt("");
        assert!(prompt.contains("(no documents have been added yet)"));
    }
}
