//! Response types for law queries

use serde::{Deserialize, Serialize};

/// Citation pointing back to a section of the source document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// Human-readable section label, e.g. "Section 3.1.1"
    pub source: String,
    /// Excerpt of the section text (at most 500 characters)
    pub text: String,
    /// Similarity score in [0, 1], rounded to 3 decimals
    pub relevance_score: f64,
}

/// Answer with citations for a single query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// The question as asked
    pub query: String,
    /// Generated answer text
    pub response: String,
    /// Citations in retrieval order
    pub citations: Vec<Citation>,
}

/// Static health payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
            service: "westeros-laws-api".to_string(),
        }
    }
}

/// Readiness payload for `/ready`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessStatus {
    /// Whether the index has been installed
    pub ready: bool,
    /// Number of sections in the installed index
    pub sections_indexed: usize,
}
