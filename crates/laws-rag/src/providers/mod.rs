//! Provider abstractions for embeddings, generation, and vector storage
//!
//! The index only talks to these traits; concrete backends are picked from
//! configuration by [`build_embedder`] and [`build_llm`].

pub mod embedding;
pub mod groq;
pub mod hashing;
pub mod llm;
pub mod memory;
pub mod ollama;
pub mod onnx;
pub mod vector_store;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use vector_store::{VectorSearchResult, VectorStoreProvider};

use std::sync::Arc;

use crate::config::{EmbeddingBackend, EmbeddingConfig, LlmBackend, LlmConfig};
use crate::error::Result;

/// Build the embedding backend for `model` using the rest of `config`
pub async fn build_embedder(
    config: &EmbeddingConfig,
    model: &str,
) -> Result<Arc<dyn EmbeddingProvider>> {
    let provider: Arc<dyn EmbeddingProvider> = match config.backend {
        EmbeddingBackend::Onnx => Arc::new(onnx::OnnxEmbedder::new(config, model).await?),
        EmbeddingBackend::Ollama => Arc::new(ollama::OllamaEmbedder::new(config, model)?),
        EmbeddingBackend::Hashing => Arc::new(hashing::HashingEmbedder::new(config.dimensions)),
    };
    tracing::info!("Embedding backend: {} ({})", provider.name(), provider.model());
    Ok(provider)
}

/// Build the generation backend for `model` using the rest of `config`
pub fn build_llm(config: &LlmConfig, model: &str) -> Result<Arc<dyn LlmProvider>> {
    let provider: Arc<dyn LlmProvider> = match config.backend {
        LlmBackend::Groq => Arc::new(groq::GroqLlm::new(config, model)?),
        LlmBackend::Ollama => Arc::new(ollama::OllamaLlm::new(config, model)?),
    };
    tracing::info!("Generation backend: {} ({})", provider.name(), provider.model());
    Ok(provider)
}
