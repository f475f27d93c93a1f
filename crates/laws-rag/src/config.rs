//! Configuration for the laws RAG service
//!
//! Values are layered: built-in defaults, then an optional TOML file named by
//! `LAWS_RAG_CONFIG`, then individual environment overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable naming an optional TOML config file
pub const CONFIG_PATH_ENV: &str = "LAWS_RAG_CONFIG";

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Source document configuration
    pub document: DocumentConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Generation (LLM) configuration
    pub llm: LlmConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable permissive CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
        }
    }
}

/// Source document configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Path to the legal document (PDF or plain text)
    pub path: PathBuf,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("docs/laws.pdf"),
        }
    }
}

/// Which embedding backend to run
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Local ONNX encoder downloaded from the HuggingFace hub
    #[default]
    Onnx,
    /// Ollama embeddings endpoint
    Ollama,
    /// Deterministic feature hashing, no model required
    Hashing,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Backend selection
    pub backend: EmbeddingBackend,
    /// Model identifier (HuggingFace repo id for onnx, model tag for ollama)
    pub model: String,
    /// Embedding dimensions (384 for bge-small)
    pub dimensions: usize,
    /// Batch size for embedding generation
    pub batch_size: usize,
    /// Maximum sequence length
    pub max_length: usize,
    /// Cache directory for downloaded models
    pub cache_dir: PathBuf,
    /// Ollama base URL (ollama backend only)
    pub ollama_base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Onnx,
            model: "BAAI/bge-small-en-v1.5".to_string(),
            dimensions: 384,
            batch_size: 32,
            max_length: 512,
            cache_dir: dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("laws-rag")
                .join("models"),
            ollama_base_url: "http://localhost:11434".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Which generation backend to call
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    /// Groq OpenAI-compatible chat completions
    #[default]
    Groq,
    /// Local Ollama server
    Ollama,
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Backend selection
    pub backend: LlmBackend,
    /// Generation model name
    pub model: String,
    /// API key (Groq). Read from `GROQ_API_KEY` when absent from the file.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Groq OpenAI-compatible base URL
    pub groq_base_url: String,
    /// Ollama base URL
    pub ollama_base_url: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Maximum tokens in the generated answer
    pub max_tokens: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: LlmBackend::Groq,
            model: "llama-3.3-70b-versatile".to_string(),
            api_key: None,
            groq_base_url: "https://api.groq.com/openai/v1".to_string(),
            ollama_base_url: "http://localhost:11434".to_string(),
            temperature: 0.1,
            max_tokens: 1024,
            timeout_secs: 120,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Default number of sections retrieved per query
    pub top_k: usize,
    /// Upper bound applied to caller-supplied result counts
    pub max_top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            max_top_k: 20,
        }
    }
}

impl RagConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration using a custom variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("Invalid config {}: {}", path.display(), e)))
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup("EMBED_MODEL") {
            self.embeddings.model = model;
        }
        if let Some(backend) = lookup("EMBED_BACKEND") {
            self.embeddings.backend = match backend.to_lowercase().as_str() {
                "onnx" => EmbeddingBackend::Onnx,
                "ollama" => EmbeddingBackend::Ollama,
                "hashing" => EmbeddingBackend::Hashing,
                other => {
                    return Err(Error::Config(format!("Unknown EMBED_BACKEND '{}'", other)))
                }
            };
        }
        if let Some(model) = lookup("GROQ_MODEL") {
            self.llm.model = model;
        }
        if let Some(backend) = lookup("LLM_BACKEND") {
            self.llm.backend = match backend.to_lowercase().as_str() {
                "groq" => LlmBackend::Groq,
                "ollama" => LlmBackend::Ollama,
                other => return Err(Error::Config(format!("Unknown LLM_BACKEND '{}'", other))),
            };
        }
        if let Some(key) = lookup("GROQ_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = lookup("GROQ_BASE_URL") {
            self.llm.groq_base_url = url;
        }
        if let Some(url) = lookup("OLLAMA_BASE_URL") {
            self.llm.ollama_base_url = url.clone();
            self.embeddings.ollama_base_url = url;
        }
        if let Some(path) = lookup("DOCUMENT_PATH") {
            self.document.path = PathBuf::from(path);
        }
        if let Some(k) = lookup("QUERY_TOP_K") {
            self.retrieval.top_k = parse_number("QUERY_TOP_K", &k)?;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = parse_number("PORT", &port)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("retrieval.top_k must be at least 1".to_string()));
        }
        if self.retrieval.max_top_k < self.retrieval.top_k {
            return Err(Error::Config(format!(
                "retrieval.max_top_k ({}) is below retrieval.top_k ({})",
                self.retrieval.max_top_k, self.retrieval.top_k
            )));
        }
        if self.embeddings.dimensions == 0 {
            return Err(Error::Config("embeddings.dimensions must be positive".to_string()));
        }
        Ok(())
    }

    /// Socket address string for the HTTP server
    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} must be a number (got '{}')", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RagConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.embeddings.model, "BAAI/bge-small-en-v1.5");
        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
        assert_eq!(config.document.path, PathBuf::from("docs/laws.pdf"));
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.address(), "0.0.0.0:8000");
    }

    #[test]
    fn test_env_overrides() {
        let config = RagConfig::from_lookup(lookup_from(&[
            ("EMBED_MODEL", "BAAI/bge-base-en-v1.5"),
            ("GROQ_MODEL", "llama-3.1-8b-instant"),
            ("EMBED_BACKEND", "hashing"),
            ("QUERY_TOP_K", "5"),
            ("DOCUMENT_PATH", "/data/laws.pdf"),
            ("PORT", "9000"),
        ]))
        .unwrap();

        assert_eq!(config.embeddings.model, "BAAI/bge-base-en-v1.5");
        assert_eq!(config.embeddings.backend, EmbeddingBackend::Hashing);
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.document.path, PathBuf::from("/data/laws.pdf"));
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_invalid_numeric_override() {
        let err = RagConfig::from_lookup(lookup_from(&[("QUERY_TOP_K", "three")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = RagConfig::from_lookup(lookup_from(&[("QUERY_TOP_K", "0")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_toml_file_then_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("laws.toml");
        std::fs::write(
            &path,
            "[retrieval]\ntop_k = 4\n\n[llm]\nbackend = \"ollama\"\nmodel = \"phi3\"\n",
        )
        .unwrap();
        let path_str = path.to_string_lossy().to_string();

        let config = RagConfig::from_lookup(lookup_from(&[
            (CONFIG_PATH_ENV, path_str.as_str()),
            ("GROQ_MODEL", "llama3.2"),
        ]))
        .unwrap();

        assert_eq!(config.retrieval.top_k, 4);
        assert_eq!(config.llm.backend, LlmBackend::Ollama);
        assert_eq!(config.llm.model, "llama3.2");
        assert_eq!(config.server.port, 8000);
    }
}
