//! Query request types

use serde::{Deserialize, Serialize};

/// Query request accepted by the HTTP layer.
///
/// Field names match the query-string form: `/query?q=...&k=...`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer (missing is treated as empty)
    #[serde(default, alias = "question")]
    pub q: String,

    /// Number of sections to retrieve (defaults to the configured `top_k`)
    #[serde(default, alias = "top_k")]
    pub k: Option<usize>,
}

impl QueryRequest {
    /// Create a new query
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            q: question.into(),
            k: None,
        }
    }

    /// Set the result count
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.k = Some(k);
        self
    }
}
