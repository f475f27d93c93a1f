//! Section records and the chunks the vector store keeps for them

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One numbered clause of the source document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRecord {
    /// Dotted numeric label without the trailing dot, e.g. "3.1.1"
    pub section_number: String,
    /// Whitespace-normalized, non-empty section body
    pub text: String,
}

impl SectionRecord {
    /// Create a new section record
    pub fn new(section_number: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            section_number: section_number.into(),
            text: text.into(),
        }
    }
}

/// A section stored in the vector index together with its embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedChunk {
    /// Chunk ID
    pub id: Uuid,
    /// Section the chunk was built from
    pub section_number: String,
    /// Section text
    pub text: String,
    /// Embedding vector
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub embedding: Vec<f32>,
}

impl IndexedChunk {
    /// Create a chunk from a section and its embedding
    pub fn from_section(section: &SectionRecord, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            section_number: section.section_number.clone(),
            text: section.text.clone(),
            embedding,
        }
    }
}

/// A retrieval hit handed to the citation assembler.
///
/// `score` is left `None` by backends that do not expose a similarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedSection {
    /// Section label, if the backend kept it
    pub section_number: Option<String>,
    /// Retrieved text
    pub text: String,
    /// Similarity score, if exposed
    pub score: Option<f32>,
}
