//! Citation assembly

use crate::types::{Citation, QueryResult, RetrievedSection};

/// Maximum characters kept from a section in a citation excerpt
pub const MAX_EXCERPT_CHARS: usize = 500;

/// Package a generated answer and its retrieved sections into a [`QueryResult`].
///
/// Keeps the retrieval order. Missing section numbers become "Unknown" and
/// missing scores become 0.0; nothing here fails.
pub fn assemble(query: &str, generated_text: &str, retrieved: &[RetrievedSection]) -> QueryResult {
    let citations = retrieved
        .iter()
        .map(|section| Citation {
            source: format!(
                "Section {}",
                section.section_number.as_deref().unwrap_or("Unknown")
            ),
            text: truncate_chars(&section.text, MAX_EXCERPT_CHARS),
            relevance_score: round_score(section.score),
        })
        .collect();

    QueryResult {
        query: query.to_string(),
        response: generated_text.to_string(),
        citations,
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

fn round_score(score: Option<f32>) -> f64 {
    match score {
        Some(s) if s.is_finite() => (f64::from(s).clamp(0.0, 1.0) * 1000.0).round() / 1000.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retrieved(number: Option<&str>, text: &str, score: Option<f32>) -> RetrievedSection {
        RetrievedSection {
            section_number: number.map(str::to_string),
            text: text.to_string(),
            score,
        }
    }

    #[test]
    fn test_labels_and_order() {
        let result = assemble(
            "What happens if I steal?",
            "A hand is taken [1].",
            &[
                retrieved(Some("3.1.1"), "Theft", Some(0.9)),
                retrieved(None, "Orphan", Some(0.95)),
            ],
        );

        assert_eq!(result.query, "What happens if I steal?");
        assert_eq!(result.response, "A hand is taken [1].");
        assert_eq!(result.citations[0].source, "Section 3.1.1");
        assert_eq!(result.citations[1].source, "Section Unknown");
    }

    #[test]
    fn test_long_excerpt_truncated_to_prefix() {
        let text = "x".repeat(750);
        let result = assemble("q", "a", &[retrieved(Some("1.1"), &text, Some(0.5))]);

        let excerpt = &result.citations[0].text;
        assert_eq!(excerpt.chars().count(), MAX_EXCERPT_CHARS);
        assert!(text.starts_with(excerpt.as_str()));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let text = "é".repeat(600);
        let result = assemble("q", "a", &[retrieved(Some("1.1"), &text, None)]);
        assert_eq!(result.citations[0].text.chars().count(), MAX_EXCERPT_CHARS);
    }

    #[test]
    fn test_short_excerpt_untouched() {
        let result = assemble("q", "a", &[retrieved(Some("1.1"), "Short.", Some(0.5))]);
        assert_eq!(result.citations[0].text, "Short.");
    }

    #[test]
    fn test_missing_score_defaults_to_zero() {
        let result = assemble("q", "a", &[retrieved(Some("1.1"), "t", None)]);
        assert_eq!(result.citations[0].relevance_score, 0.0);
    }

    #[test]
    fn test_score_rounding_and_clamping() {
        let result = assemble(
            "q",
            "a",
            &[
                retrieved(Some("1.1"), "t", Some(0.876_54)),
                retrieved(Some("1.2"), "t", Some(-0.2)),
                retrieved(Some("1.3"), "t", Some(f32::NAN)),
            ],
        );

        assert_eq!(result.citations[0].relevance_score, 0.877);
        assert_eq!(result.citations[1].relevance_score, 0.0);
        assert_eq!(result.citations[2].relevance_score, 0.0);
    }

    #[test]
    fn test_no_retrieved_sections() {
        let result = assemble("q", "No sources.", &[]);
        assert!(result.citations.is_empty());
    }
}
