//! Vector store provider trait for storing and searching section embeddings

use async_trait::async_trait;
use crate::error::Result;
use crate::types::{IndexedChunk, RetrievedSection};

/// Search result from a vector store
#[derive(Debug, Clone)]
pub struct VectorSearchResult {
    /// The matched chunk
    pub chunk: IndexedChunk,
    /// Similarity score, when the backend exposes one
    pub similarity: Option<f32>,
}

impl VectorSearchResult {
    /// Convert into the assembler's input form
    pub fn into_retrieved(self) -> RetrievedSection {
        let section_number = Some(self.chunk.section_number).filter(|s| !s.is_empty());
        RetrievedSection {
            section_number,
            text: self.chunk.text,
            score: self.similarity,
        }
    }
}

/// Trait for vector storage and similarity search
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Insert chunks with their embeddings
    async fn insert_chunks(&self, chunks: Vec<IndexedChunk>) -> Result<()>;

    /// Return the `top_k` most similar chunks, most similar first
    async fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<VectorSearchResult>>;

    /// Number of chunks stored
    async fn len(&self) -> Result<usize>;

    /// Check if store is empty
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Provider name for logging
    fn name(&self) -> &str;
}
