//! Prompt templates for cited answers

use crate::types::RetrievedSection;

/// Prompt builder for law queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Number retrieved sections as `Source 1:`, `Source 2:` ... in retrieval order
    pub fn build_context(sections: &[RetrievedSection]) -> String {
        sections
            .iter()
            .enumerate()
            .map(|(i, section)| format!("Source {}:\n{}\n\n", i + 1, section.text))
            .collect()
    }

    /// Build the citation prompt sent to the generation backend
    pub fn build_citation_prompt(question: &str, context: &str) -> String {
        format!(
            r#"You are an expert on the Laws of the Seven Kingdoms. Answer the question directly based on the sources provided. Cite sources using [1], [2], etc. Be specific and confident.

Sources:
{context}

Question: {question}

Answer: "#,
            context = context.trim_end(),
            question = question
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(text: &str) -> RetrievedSection {
        RetrievedSection {
            section_number: Some("1.1".to_string()),
            text: text.to_string(),
            score: None,
        }
    }

    #[test]
    fn test_build_context_numbers_sources() {
        let context = PromptBuilder::build_context(&[section("Theft."), section("Arson.")]);
        assert_eq!(context, "Source 1:\nTheft.\n\nSource 2:\nArson.\n\n");
    }

    #[test]
    fn test_prompt_contains_question_and_sources() {
        let prompt = PromptBuilder::build_citation_prompt("Is arson legal?", "Source 1:\nArson.\n\n");
        assert!(prompt.contains("Cite sources using [1], [2]"));
        assert!(prompt.contains("Sources:\nSource 1:\nArson.\n\nQuestion: Is arson legal?"));
        assert!(prompt.ends_with("Answer: "));
    }
}
