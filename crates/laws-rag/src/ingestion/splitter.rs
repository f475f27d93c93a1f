//! Splits extracted document text into numbered sections

use regex::Regex;
use std::sync::OnceLock;

use crate::types::SectionRecord;

/// Header token at the start of a line: "3.", "3.1.", "10.1.1.1." followed by a newline
fn header_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*(\d+(?:\.\d+)*)\.[ \t]*\r?\n").expect("valid header regex")
    })
}

/// Partition raw document text into section records.
///
/// Headers with two or more levels open a section; single-level headers
/// (chapter numbers) only close the previous one. Text before the first
/// header and sections left empty after normalization are dropped.
pub fn split_sections(raw_text: &str) -> Vec<SectionRecord> {
    let headers: Vec<_> = header_pattern().captures_iter(raw_text).collect();
    let mut sections = Vec::new();

    for (i, caps) in headers.iter().enumerate() {
        let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
            continue;
        };

        if !number.as_str().contains('.') {
            continue;
        }

        let end = headers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(raw_text.len());

        let text = normalize_whitespace(&raw_text[whole.end()..end]);
        if text.is_empty() {
            tracing::debug!("Dropping empty section {}", number.as_str());
            continue;
        }

        sections.push(SectionRecord::new(number.as_str(), text));
    }

    tracing::debug!("Split {} sections from {} headers", sections.len(), headers.len());
    sections
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_two_sections() {
        let text = "3.1.1.\nTheft from a Sept is punished by...\n3.1.2.\nArson is punished by...";
        let sections = split_sections(text);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].section_number, "3.1.1");
        assert_eq!(sections[0].text, "Theft from a Sept is punished by...");
        assert_eq!(sections[1].section_number, "3.1.2");
        assert_eq!(sections[1].text, "Arson is punished by...");
    }

    #[test]
    fn test_no_headers_yields_nothing() {
        assert!(split_sections("").is_empty());
        assert!(split_sections("The laws of the realm are many.\nNone are numbered.").is_empty());
        // Number not at the end of a header line
        assert!(split_sections("See 3.1.1. for details\n").is_empty());
    }

    #[test]
    fn test_preamble_discarded() {
        let text = "LAWS OF THE SEVEN KINGDOMS\nPreamble text.\n1.1.\nThe King's word is law.";
        let sections = split_sections(text);

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].section_number, "1.1");
        assert!(!sections[0].text.contains("Preamble"));
    }

    #[test]
    fn test_single_level_headers_close_sections() {
        let text = "1.\nCrown\n1.1.\nThe King rules.\n2.\nFaith\n2.1.\nThe Sept is sacred.";
        let sections = split_sections(text);

        let numbers: Vec<_> = sections.iter().map(|s| s.section_number.as_str()).collect();
        assert_eq!(numbers, vec!["1.1", "2.1"]);
        assert_eq!(sections[0].text, "The King rules.");
    }

    #[test]
    fn test_newlines_collapsed_and_trimmed() {
        let text = "10.1.1.1.\n  Murder of a guest\nunder the roof\n\nbreaks guest right.  \n";
        let sections = split_sections(text);

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].section_number, "10.1.1.1");
        assert_eq!(sections[0].text, "Murder of a guest under the roof breaks guest right.");
    }

    #[test]
    fn test_empty_section_dropped() {
        let text = "4.1.\n   \n4.2.\nTrial by combat is permitted.";
        let sections = split_sections(text);

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].section_number, "4.2");
    }

    #[test]
    fn test_duplicate_headers_kept_in_order() {
        let text = "5.1.\nFirst.\n5.1.\nSecond.";
        let sections = split_sections(text);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].text, "First.");
        assert_eq!(sections[1].text, "Second.");
    }

    #[test]
    fn test_trailing_spaces_and_crlf_after_header() {
        let text = "6.2.  \r\nDesertion from the Night's Watch is death.";
        let sections = split_sections(text);

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].section_number, "6.2");
    }

    #[test]
    fn test_every_section_well_formed() {
        let text = "Intro\n1.1.\nA.\n1.2.\n\n2.\n2.1.\nB\nC\n2.1.1.\nD";
        let pattern = Regex::new(r"^\d+(\.\d+)+$").unwrap();
        let sections = split_sections(text);

        assert!(!sections.is_empty());
        for section in &sections {
            assert!(!section.text.is_empty());
            assert!(pattern.is_match(&section.section_number));
        }
    }
}
