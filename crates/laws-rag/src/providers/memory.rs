//! In-memory vector store
//!
//! Brute-force cosine search over every stored chunk. The store lives only as
//! long as the process; reconnecting the index replaces it.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::types::IndexedChunk;

use super::vector_store::{VectorSearchResult, VectorStoreProvider};

/// Memory-only vector store
#[derive(Default)]
pub struct InMemoryVectorStore {
    chunks: RwLock<Vec<IndexedChunk>>,
}

impl InMemoryVectorStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn search_sync(&self, query: &[f32], top_k: usize) -> Result<Vec<VectorSearchResult>> {
        let chunks = self.chunks.read();

        let mut scored = Vec::with_capacity(chunks.len());
        for chunk in chunks.iter() {
            if chunk.embedding.len() != query.len() {
                return Err(Error::backend(
                    "memory",
                    format!(
                        "dimension mismatch: query has {}, chunk {} has {}",
                        query.len(),
                        chunk.id,
                        chunk.embedding.len()
                    ),
                ));
            }
            scored.push((cosine_similarity(query, &chunk.embedding), chunk));
        }

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(similarity, chunk)| VectorSearchResult {
                chunk: chunk.clone(),
                similarity: Some(similarity),
            })
            .collect())
    }
}

#[async_trait]
impl VectorStoreProvider for InMemoryVectorStore {
    async fn insert_chunks(&self, chunks: Vec<IndexedChunk>) -> Result<()> {
        if let Some(chunk) = chunks.iter().find(|c| c.embedding.is_empty()) {
            return Err(Error::backend(
                "memory",
                format!("chunk for section {} has no embedding", chunk.section_number),
            ));
        }
        self.chunks.write().extend(chunks);
        Ok(())
    }

    async fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<VectorSearchResult>> {
        self.search_sync(query_embedding, top_k)
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.chunks.read().len())
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}

/// Cosine similarity between two embeddings (0.0 when either is a zero vector)
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
