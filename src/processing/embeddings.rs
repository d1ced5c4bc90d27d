//! Embedding provider backed by Model2Vec, plus the process-wide slot that
//! loads it at most once

use crate::config::Config;
use crate::error::{ApplyLessError, Result};
use log::info;
use model2vec_rs::model::StaticModel;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Converts a text span into a fixed-length dense vector.
///
/// Implementations must be safe for concurrent read-only use; the engine
/// shares one provider across all in-flight requests.
pub trait EmbeddingProvider: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Default implementation calls `embed` for each text
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn model_name(&self) -> &str;
}

/// Shared handle the semantic matcher holds on to
pub type ProviderHandle = Arc<dyn EmbeddingProvider>;

pub struct Model2VecProvider {
    model: StaticModel,
    model_name: String,
}

impl Model2VecProvider {
    pub fn load(model_path: &Path, model_name: &str) -> Result<Self> {
        let start_time = Instant::now();

        info!("Loading Model2Vec embedding model from: {}", model_path.display());

        let model = StaticModel::from_pretrained(
            model_path,
            None, // token
            None, // normalize
            None, // subfolder
        )
        .map_err(|e| ApplyLessError::ModelUnavailable(format!("Failed to load model '{}': {}", model_name, e)))?;

        info!("Model loaded successfully in {:.2?}", start_time.elapsed());

        Ok(Self {
            model,
            model_name: model_name.to_string(),
        })
    }

    /// Load the default model named in the config
    pub fn from_config(config: &Config) -> Result<Self> {
        let model_name = &config.models.default_embedding_model;
        let model_path = Self::resolve_model_path(config);
        Self::load(&model_path, model_name)
    }

    /// Prefer a downloaded copy under the models dir, else treat the name as a Hub repo id
    fn resolve_model_path(config: &Config) -> PathBuf {
        let model_name = &config.models.default_embedding_model;
        let local_path = config.models_dir().join(model_name);
        if local_path.exists() {
            return local_path;
        }
        config
            .get_model_by_name(model_name)
            .map(|m| PathBuf::from(&m.repo_id))
            .unwrap_or_else(|| PathBuf::from(model_name))
    }
}

impl EmbeddingProvider for Model2VecProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embedding = self.model.encode_single(text);
        if embedding.is_empty() {
            return Err(ApplyLessError::Embedding(format!(
                "Model '{}' returned an empty embedding",
                self.model_name
            )));
        }
        Ok(embedding)
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(self.model.encode(texts))
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Process-wide home of the embedding provider.
///
/// The loader runs at most once even under concurrent first access; a
/// failed load leaves the slot empty so startup can report
/// `ModelUnavailable` and stop.
#[derive(Default)]
pub struct ProviderSlot {
    cell: OnceCell<ProviderHandle>,
}

impl ProviderSlot {
    pub fn new() -> Self {
        Self { cell: OnceCell::new() }
    }

    pub fn get_or_init<F>(&self, loader: F) -> Result<ProviderHandle>
    where
        F: FnOnce() -> Result<ProviderHandle>,
    {
        self.cell.get_or_try_init(loader).map(Arc::clone)
    }

    pub fn handle(&self) -> Option<ProviderHandle> {
        self.cell.get().cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Drop the slot's reference; handles already given out stay valid
    pub fn teardown(&mut self) -> Option<ProviderHandle> {
        self.cell.take()
    }
}

/// Cosine similarity clamped to [0, 1]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(ApplyLessError::Embedding(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    if a.is_empty() {
        return Ok(0.0);
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    let score = dot_product / (norm_a * norm_b);
    if score.is_nan() {
        return Ok(0.0);
    }
    Ok(score.clamp(0.0, 1.0))
}
