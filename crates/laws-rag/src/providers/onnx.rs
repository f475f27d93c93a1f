//! ONNX-based embedding generation
//!
//! Runs a HuggingFace sentence encoder (default `BAAI/bge-small-en-v1.5`)
//! locally. The ONNX export and tokenizer are downloaded from the hub into the
//! cache directory on first use.

use async_trait::async_trait;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokenizers::Tokenizer;

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;

/// How token states are reduced to one vector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pooling {
    /// First ([CLS]) token, used by the BGE family
    Cls,
    /// Attention-masked mean over all tokens
    Mean,
}

impl Pooling {
    /// Pick the pooling a model was trained with
    pub fn for_model(model_id: &str) -> Self {
        if model_id.to_lowercase().contains("bge") {
            Self::Cls
        } else {
            Self::Mean
        }
    }
}

struct OnnxModel {
    session: Session,
    tokenizer: Tokenizer,
}

/// ONNX-based text embedder
pub struct OnnxEmbedder {
    model: Arc<Mutex<OnnxModel>>,
    model_id: String,
    pooling: Pooling,
    dimensions: usize,
    max_length: usize,
    batch_size: usize,
}

impl OnnxEmbedder {
    /// Create a new ONNX embedder for a HuggingFace model id
    pub async fn new(config: &EmbeddingConfig, model_id: &str) -> Result<Self> {
        tracing::info!("Initializing ONNX embedder with model: {}", model_id);

        let model_dir = config.cache_dir.join(model_id.replace('/', "--"));
        std::fs::create_dir_all(&model_dir)
            .map_err(|e| Error::Config(format!("Failed to create cache directory: {}", e)))?;

        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        if !model_path.exists() {
            download_file(model_id, "onnx/model.onnx", &model_path).await?;
        }
        if !tokenizer_path.exists() {
            download_file(model_id, "tokenizer.json", &tokenizer_path).await?;
        }

        let (session, tokenizer) = tokio::task::spawn_blocking(move || load_model(&model_path, &tokenizer_path))
            .await
            .map_err(|e| onnx_error(format!("Task join error: {}", e)))??;

        tracing::info!("ONNX embedder initialized successfully");

        Ok(Self {
            model: Arc::new(Mutex::new(OnnxModel { session, tokenizer })),
            model_id: model_id.to_string(),
            pooling: Pooling::for_model(model_id),
            dimensions: config.dimensions,
            max_length: config.max_length,
            batch_size: config.batch_size.max(1),
        })
    }
}

fn load_model(model_path: &Path, tokenizer_path: &Path) -> Result<(Session, Tokenizer)> {
    let session = Session::builder()
        .map_err(|e| onnx_error(format!("Failed to create session builder: {}", e)))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| onnx_error(format!("Failed to set optimization level: {}", e)))?
        .with_intra_threads(4)
        .map_err(|e| onnx_error(format!("Failed to set threads: {}", e)))?
        .commit_from_file(model_path)
        .map_err(|e| onnx_error(format!("Failed to load model: {}", e)))?;

    let tokenizer = Tokenizer::from_file(tokenizer_path)
        .map_err(|e| onnx_error(format!("Failed to load tokenizer: {}", e)))?;

    Ok((session, tokenizer))
}

fn onnx_error(message: impl Into<String>) -> Error {
    Error::backend("onnx", message)
}

impl OnnxModel {
    fn embed_batch(
        &mut self,
        texts: &[String],
        pooling: Pooling,
        max_length: usize,
        dimensions: usize,
    ) -> Result<Vec<Vec<f32>>> {
        let batch_size = texts.len();
        let inputs: Vec<&str> = texts.iter().map(String::as_str).collect();

        let encodings = self
            .tokenizer
            .encode_batch(inputs, true)
            .map_err(|e| onnx_error(format!("Tokenization failed: {}", e)))?;

        let max_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0)
            .min(max_length)
            .max(1);

        let mut input_ids = vec![0i64; batch_size * max_len];
        let mut attention_mask = vec![0i64; batch_size * max_len];
        let mut token_type_ids = vec![0i64; batch_size * max_len];

        for (i, encoding) in encodings.iter().enumerate() {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            let types = encoding.get_type_ids();

            for j in 0..ids.len().min(max_len) {
                input_ids[i * max_len + j] = ids[j] as i64;
                attention_mask[i * max_len + j] = mask[j] as i64;
                token_type_ids[i * max_len + j] = types[j] as i64;
            }
        }

        let input_ids_tensor = Tensor::from_array((vec![batch_size, max_len], input_ids.into_boxed_slice()))
            .map_err(|e| onnx_error(format!("Input tensor creation failed: {}", e)))?;
        let attention_mask_tensor = Tensor::from_array((
            vec![batch_size, max_len],
            attention_mask.clone().into_boxed_slice(),
        ))
        .map_err(|e| onnx_error(format!("Attention mask tensor creation failed: {}", e)))?;
        let token_type_ids_tensor =
            Tensor::from_array((vec![batch_size, max_len], token_type_ids.into_boxed_slice()))
                .map_err(|e| onnx_error(format!("Token type tensor creation failed: {}", e)))?;

        let session_inputs = vec![
            ("input_ids", input_ids_tensor.into_dyn()),
            ("attention_mask", attention_mask_tensor.into_dyn()),
            ("token_type_ids", token_type_ids_tensor.into_dyn()),
        ];

        let outputs = self
            .session
            .run(session_inputs)
            .map_err(|e| onnx_error(format!("Inference failed: {}", e)))?;

        // last_hidden_state: [batch, seq, hidden]
        let output_iter: Vec<_> = outputs.iter().collect();
        let output = output_iter
            .iter()
            .find(|(name, _)| *name == "last_hidden_state")
            .or_else(|| output_iter.first())
            .map(|(_, v)| v)
            .ok_or_else(|| onnx_error("No output tensor"))?;

        let (tensor_shape, tensor_data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| onnx_error(format!("Failed to extract tensor: {}", e)))?;

        let dims: Vec<usize> = tensor_shape.iter().map(|&d| d as usize).collect();
        let hidden_size = dims.get(2).copied().unwrap_or(dimensions);

        let mut embeddings = Vec::with_capacity(batch_size);
        for i in 0..batch_size {
            let token_state = |j: usize, k: usize| {
                tensor_data
                    .get(i * max_len * hidden_size + j * hidden_size + k)
                    .copied()
                    .unwrap_or(0.0)
            };

            let mut pooled = vec![0.0f32; hidden_size];
            match pooling {
                Pooling::Cls => {
                    for (k, val) in pooled.iter_mut().enumerate() {
                        *val = token_state(0, k);
                    }
                }
                Pooling::Mean => {
                    let mut count = 0.0f32;
                    for j in 0..max_len {
                        if attention_mask[i * max_len + j] > 0 {
                            for (k, val) in pooled.iter_mut().enumerate() {
                                *val += token_state(j, k);
                            }
                            count += 1.0;
                        }
                    }
                    if count > 0.0 {
                        for val in &mut pooled {
                            *val /= count;
                        }
                    }
                }
            }

            l2_normalize(&mut pooled);
            embeddings.push(pooled);
        }

        Ok(embeddings)
    }
}

fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for val in vector.iter_mut() {
            *val /= norm;
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OnnxEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| onnx_error("Empty embedding result"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = Arc::clone(&self.model);
        let texts = texts.to_vec();
        let (pooling, max_length, dimensions, batch_size) =
            (self.pooling, self.max_length, self.dimensions, self.batch_size);

        tokio::task::spawn_blocking(move || {
            let mut guard = model.lock();
            let mut all = Vec::with_capacity(texts.len());
            for batch in texts.chunks(batch_size) {
                all.extend(guard.embed_batch(batch, pooling, max_length, dimensions)?);
            }
            Ok(all)
        })
        .await
        .map_err(|e| onnx_error(format!("Task join error: {}", e)))?
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "onnx"
    }

    fn model(&self) -> &str {
        &self.model_id
    }
}

/// Download one file of a HuggingFace model repository
async fn download_file(model_id: &str, file: &str, path: &PathBuf) -> Result<()> {
    let url = format!("https://huggingface.co/{}/resolve/main/{}", model_id, file);

    tracing::info!("Downloading {} from: {}", file, url);

    let response = reqwest::get(&url)
        .await
        .map_err(|e| onnx_error(format!("Failed to download {}: {}", file, e)))?;

    if !response.status().is_success() {
        return Err(onnx_error(format!(
            "Download of {} failed: HTTP {}",
            file,
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| onnx_error(format!("Failed to read {} bytes: {}", file, e)))?;

    tokio::fs::write(path, &bytes)
        .await
        .map_err(|e| onnx_error(format!("Failed to save {}: {}", file, e)))?;

    tracing::info!("Downloaded {} ({} bytes)", file, bytes.len());

    Ok(())
}
