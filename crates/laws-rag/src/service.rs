//! Query service facade shared by the HTTP handlers
//!
//! Holds the index once it has been built and applies request validation in
//! front of it. The index is installed exactly once by the startup task.

use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;

use crate::config::{RagConfig, RetrievalConfig};
use crate::error::{Error, Result};
use crate::index::SectionIndex;
use crate::ingestion::{load_document_text, split_sections};
use crate::types::{QueryResult, ReadinessStatus, SectionRecord};

/// Shared query service
#[derive(Clone)]
pub struct QueryService {
    inner: Arc<QueryServiceInner>,
}

struct QueryServiceInner {
    retrieval: RetrievalConfig,
    index: RwLock<Option<Arc<SectionIndex>>>,
    sections_indexed: RwLock<usize>,
}

impl QueryService {
    /// Create a service with no index installed
    pub fn new(retrieval: RetrievalConfig) -> Self {
        Self {
            inner: Arc::new(QueryServiceInner {
                retrieval,
                index: RwLock::new(None),
                sections_indexed: RwLock::new(0),
            }),
        }
    }

    /// Install a loaded index and mark the service ready
    pub async fn install(&self, index: SectionIndex) {
        let count = index.len().await;
        *self.inner.sections_indexed.write() = count;
        *self.inner.index.write() = Some(Arc::new(index));
        tracing::info!("Query service ready ({} sections indexed)", count);
    }

    /// Whether an index has been installed
    pub fn is_ready(&self) -> bool {
        self.inner.index.read().is_some()
    }

    /// Number of sections in the installed index
    pub fn sections_indexed(&self) -> usize {
        *self.inner.sections_indexed.read()
    }

    /// Readiness snapshot for `/ready`
    pub fn readiness(&self) -> ReadinessStatus {
        ReadinessStatus {
            ready: self.is_ready(),
            sections_indexed: self.sections_indexed(),
        }
    }

    /// Answer a question, retrieving `top_k` sections (or the configured default)
    pub async fn handle_query(&self, raw: &str, top_k: Option<usize>) -> Result<QueryResult> {
        if raw.trim().is_empty() {
            return Err(Error::EmptyQuery);
        }

        let index = self
            .inner
            .index
            .read()
            .clone()
            .ok_or(Error::ServiceNotReady)?;

        let top_k = self.resolve_top_k(top_k)?;

        tracing::info!("Query: \"{}\" (k={})", raw, top_k);

        index.query(raw, top_k).await.map_err(|e| {
            tracing::error!("Error processing query: {}", e);
            Error::QueryProcessingFailed(e.to_string())
        })
    }

    fn resolve_top_k(&self, requested: Option<usize>) -> Result<usize> {
        let max = self.inner.retrieval.max_top_k.max(1);
        match requested {
            Some(0) => Err(Error::InvalidTopK(0)),
            Some(k) if k > max => {
                tracing::debug!("Clamping k={} to {}", k, max);
                Ok(max)
            }
            Some(k) => Ok(k),
            None => Ok(self.inner.retrieval.top_k.clamp(1, max)),
        }
    }
}

/// Load and split the configured document
pub async fn load_sections(path: &Path) -> Result<Vec<SectionRecord>> {
    let owned = path.to_path_buf();
    let text = tokio::task::spawn_blocking(move || load_document_text(&owned))
        .await
        .map_err(|e| Error::document_unreadable(path.display().to_string(), format!("loader task failed: {}", e)))??;

    let sections = split_sections(&text);
    tracing::info!("Split document into {} sections", sections.len());
    Ok(sections)
}

/// Build a connected, loaded index from configuration
pub async fn build_index(config: &RagConfig) -> Result<SectionIndex> {
    let sections = load_sections(&config.document.path).await?;

    let mut index = SectionIndex::new(config.clone());
    index
        .connect(&config.embeddings.model, &config.llm.model)
        .await?;
    tracing::info!(
        "Index connected (embeddings: {}, generation: {})",
        index.embedding_model().unwrap_or("none"),
        index.generation_model().unwrap_or("none")
    );
    index.load(&sections).await?;

    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{hashing::HashingEmbedder, LlmProvider};
    use async_trait::async_trait;

    struct FixedLlm(&'static str);

    #[async_trait]
    impl LlmProvider for FixedLlm {
        async fn generate_answer(&self, _question: &str, _context: &str) -> Result<String> {
            Ok(self.0.to_string())
        }

        fn name(&self) -> &str {
            "fixed"
        }

        fn model(&self) -> &str {
            "fixed"
        }
    }

    struct DownLlm;

    #[async_trait]
    impl LlmProvider for DownLlm {
        async fn generate_answer(&self, _question: &str, _context: &str) -> Result<String> {
            Err(Error::backend("groq", "connection refused"))
        }

        fn name(&self) -> &str {
            "groq"
        }

        fn model(&self) -> &str {
            "llama-3.3-70b-versatile"
        }
    }

    async fn ready_service(llm: Arc<dyn LlmProvider>) -> QueryService {
        let mut index = SectionIndex::new(RagConfig::default());
        index.connect_with(Arc::new(HashingEmbedder::new(384)), llm);
        index
            .load(&[
                SectionRecord::new("1.1.1", "The King's peace binds all lords."),
                SectionRecord::new("1.1.2", "Guest right may not be broken."),
                SectionRecord::new("1.1.3", "Kinslaying is cursed by gods and men."),
            ])
            .await
            .unwrap();

        let service = QueryService::new(RetrievalConfig::default());
        service.install(index).await;
        service
    }

    #[tokio::test]
    async fn test_empty_query_rejected_before_readiness() {
        let service = QueryService::new(RetrievalConfig::default());
        assert!(matches!(service.handle_query("", None).await, Err(Error::EmptyQuery)));
        assert!(matches!(service.handle_query("   \n", None).await, Err(Error::EmptyQuery)));
    }

    #[tokio::test]
    async fn test_not_ready() {
        let service = QueryService::new(RetrievalConfig::default());
        assert!(!service.is_ready());
        let err = service.handle_query("What is guest right?", None).await.unwrap_err();
        assert!(matches!(err, Error::ServiceNotReady));
    }

    #[tokio::test]
    async fn test_install_reports_readiness() {
        let service = ready_service(Arc::new(FixedLlm("ok"))).await;
        assert!(service.is_ready());
        assert_eq!(service.sections_indexed(), 3);
        assert_eq!(
            service.readiness(),
            ReadinessStatus {
                ready: true,
                sections_indexed: 3
            }
        );
    }

    #[tokio::test]
    async fn test_default_and_clamped_top_k() {
        let service = ready_service(Arc::new(FixedLlm("ok"))).await;

        let result = service.handle_query("guest right", None).await.unwrap();
        assert_eq!(result.citations.len(), 3);

        let result = service.handle_query("guest right", Some(1)).await.unwrap();
        assert_eq!(result.citations.len(), 1);

        // Clamped to max_top_k, then limited by what is indexed
        let result = service.handle_query("guest right", Some(500)).await.unwrap();
        assert_eq!(result.citations.len(), 3);

        assert!(matches!(
            service.handle_query("guest right", Some(0)).await,
            Err(Error::InvalidTopK(0))
        ));
    }

    #[tokio::test]
    async fn test_backend_error_wrapped() {
        let service = ready_service(Arc::new(DownLlm)).await;
        let err = service.handle_query("guest right", None).await.unwrap_err();

        assert_eq!(err.kind(), "query_processing_failed");
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_load_sections_from_text() {
        use std::io::Write;

        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(
            file,
            "3.\nCrimes\n3.1.1.\nTheft from a Sept is punished by...\n3.1.2.\nArson is punished by...\n"
        )
        .unwrap();

        let sections = load_sections(file.path()).await.unwrap();
        let numbers: Vec<&str> = sections.iter().map(|s| s.section_number.as_str()).collect();
        assert_eq!(numbers, vec!["3.1.1", "3.1.2"]);
    }

    #[tokio::test]
    async fn test_build_index_missing_document() {
        let mut config = RagConfig::default();
        config.document.path = "/no/such/laws.pdf".into();
        let err = build_index(&config).await.err().unwrap();
        assert!(matches!(err, Error::DocumentUnreadable { .. }));
    }
}
