//! Section index: connect / load / query lifecycle over the providers

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::generation::{assemble, PromptBuilder};
use crate::providers::{
    build_embedder, build_llm, memory::InMemoryVectorStore, EmbeddingProvider, LlmProvider,
    VectorStoreProvider,
};
use crate::types::{IndexedChunk, QueryResult, RetrievedSection, SectionRecord};

struct Connection {
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    store: Arc<dyn VectorStoreProvider>,
}

/// Vector index over the document's sections.
///
/// `connect` must run before `load` or `query`. Connecting again drops the
/// previous store and everything loaded into it.
pub struct SectionIndex {
    config: RagConfig,
    connection: Option<Connection>,
}

impl SectionIndex {
    /// Create an unconnected index
    pub fn new(config: RagConfig) -> Self {
        Self {
            config,
            connection: None,
        }
    }

    /// Configure backends for the given model ids and start a fresh in-memory store
    pub async fn connect(&mut self, embedding_model_id: &str, generation_model_id: &str) -> Result<()> {
        let embedder = build_embedder(&self.config.embeddings, embedding_model_id).await?;
        let llm = build_llm(&self.config.llm, generation_model_id)?;
        self.connect_with(embedder, llm);
        Ok(())
    }

    /// Connect with already-constructed backends
    pub fn connect_with(&mut self, embedder: Arc<dyn EmbeddingProvider>, llm: Arc<dyn LlmProvider>) {
        if self.connection.is_some() {
            tracing::warn!("Reconnecting index; previously loaded sections are discarded");
        }
        self.connection = Some(Connection {
            embedder,
            llm,
            store: Arc::new(InMemoryVectorStore::new()),
        });
    }

    fn connection(&self) -> Result<&Connection> {
        self.connection.as_ref().ok_or(Error::NotConnected)
    }

    /// Embed and insert one chunk per section record
    pub async fn load(&self, records: &[SectionRecord]) -> Result<()> {
        let conn = self.connection()?;
        if records.is_empty() {
            tracing::warn!("No sections to load");
            return Ok(());
        }

        let texts: Vec<String> = records.iter().map(|r| r.text.clone()).collect();
        let embeddings = conn
            .embedder
            .embed_batch(&texts)
            .await
            .map_err(|e| into_backend_failure(conn.embedder.name(), e))?;

        if embeddings.len() != records.len() {
            return Err(Error::backend(
                conn.embedder.name(),
                format!("expected {} embeddings, got {}", records.len(), embeddings.len()),
            ));
        }

        let chunks: Vec<IndexedChunk> = records
            .iter()
            .zip(embeddings)
            .map(|(record, embedding)| IndexedChunk::from_section(record, embedding))
            .collect();

        conn.store.insert_chunks(chunks).await?;

        tracing::info!(
            "Loaded {} sections into {} store",
            records.len(),
            conn.store.name()
        );
        Ok(())
    }

    /// Retrieve the `top_k` closest sections, generate a cited answer, and assemble the result
    pub async fn query(&self, text: &str, top_k: usize) -> Result<QueryResult> {
        let conn = self.connection()?;
        if top_k == 0 {
            return Err(Error::InvalidTopK(top_k));
        }

        let query_embedding = conn
            .embedder
            .embed(text)
            .await
            .map_err(|e| into_backend_failure(conn.embedder.name(), e))?;

        let retrieved: Vec<RetrievedSection> = conn
            .store
            .search(&query_embedding, top_k)
            .await?
            .into_iter()
            .map(|r| r.into_retrieved())
            .collect();

        tracing::debug!("Retrieved {} sections for query", retrieved.len());

        let context = PromptBuilder::build_context(&retrieved);
        let answer = conn
            .llm
            .generate_answer(text, &context)
            .await
            .map_err(|e| into_backend_failure(conn.llm.name(), e))?;

        Ok(assemble(text, &answer, &retrieved))
    }

    /// Number of indexed sections (0 when not connected)
    pub async fn len(&self) -> usize {
        match &self.connection {
            Some(conn) => conn.store.len().await.unwrap_or(0),
            None => 0,
        }
    }

    /// Whether the index holds no sections
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Connected embedding model id
    pub fn embedding_model(&self) -> Option<&str> {
        self.connection.as_ref().map(|c| c.embedder.model())
    }

    /// Connected generation model id
    pub fn generation_model(&self) -> Option<&str> {
        self.connection.as_ref().map(|c| c.llm.model())
    }
}

/// Wrap a provider error as a backend failure, keeping existing ones as-is
fn into_backend_failure(backend: &str, err: Error) -> Error {
    match err {
        Error::BackendFailure { .. } => err,
        other => Error::backend(backend, other.to_string()),
    }
}
