//! Embedding model management: catalogue, download and local lookup

use crate::config::{AvailableModel, Config};
use crate::error::{ApplyLessError, Result};
use hf_hub::api::tokio::Api;
use log::{info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;

const REQUIRED_FILES: [&str; 3] = ["model.safetensors", "tokenizer.json", "config.json"];
const OPTIONAL_FILES: [&str; 1] = ["README.md"];

/// Handles download and discovery of Model2Vec models under the models dir
pub struct EmbeddingModelManager {
    models_dir: PathBuf,
    catalogue: Vec<AvailableModel>,
    downloaded_models: HashSet<String>,
}

impl EmbeddingModelManager {
    pub async fn new(config: &Config) -> Result<Self> {
        let models_dir = config.models_dir().clone();
        if !models_dir.exists() {
            fs::create_dir_all(&models_dir).await.map_err(|e| {
                ApplyLessError::ModelError(format!("Failed to create models directory: {}", e))
            })?;
        }

        let mut manager = Self {
            models_dir,
            catalogue: config.models.available_models.clone(),
            downloaded_models: HashSet::new(),
        };
        manager.scan_downloaded_models().await?;
        Ok(manager)
    }

    async fn scan_downloaded_models(&mut self) -> Result<()> {
        let mut entries = fs::read_dir(&self.models_dir).await.map_err(|e| {
            ApplyLessError::ModelError(format!("Failed to scan models directory: {}", e))
        })?;

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() && Self::is_complete_model_dir(&entry.path()).await {
                self.downloaded_models
                    .insert(entry.file_name().to_string_lossy().to_string());
            }
        }

        Ok(())
    }

    async fn is_complete_model_dir(path: &Path) -> bool {
        for file in REQUIRED_FILES {
            if fs::metadata(path.join(file)).await.is_err() {
                return false;
            }
        }
        true
    }

    /// Download a catalogue model from the Hugging Face Hub
    pub async fn download_model(&mut self, model_id: &str, force: bool) -> Result<PathBuf> {
        let model_info = self
            .get_model_info(model_id)
            .cloned()
            .ok_or_else(|| ApplyLessError::ModelNotFound(model_id.to_string()))?;

        let model_dir = self.models_dir.join(&model_info.name);
        if !force && self.is_model_downloaded(&model_info.name) {
            return Ok(model_dir);
        }

        info!("Downloading embedding model {} ({} MB) from {}", model_info.name, model_info.size_mb, model_info.repo_id);

        fs::create_dir_all(&model_dir).await?;

        let api = Api::new().map_err(|e| ApplyLessError::ModelError(format!("Failed to initialize HF API: {}", e)))?;
        let repo = api.model(model_info.repo_id.clone());

        for file in REQUIRED_FILES {
            let cached = repo.get(file).await.map_err(|e| {
                ApplyLessError::ModelError(format!("Failed to download required file {}: {}", file, e))
            })?;
            fs::copy(&cached, model_dir.join(file)).await?;
            info!("Downloaded: {}", file);
        }

        for file in OPTIONAL_FILES {
            match repo.get(file).await {
                Ok(cached) => {
                    fs::copy(&cached, model_dir.join(file)).await?;
                }
                Err(e) => warn!("Optional file {} not found: {}", file, e),
            }
        }

        self.downloaded_models.insert(model_info.name.clone());
        Ok(model_dir)
    }

    pub async fn remove_model(&mut self, model_id: &str) -> Result<PathBuf> {
        let name = self
            .resolve_model_id(model_id)
            .unwrap_or_else(|| model_id.to_string());
        if !self.is_model_downloaded(&name) {
            return Err(ApplyLessError::ModelNotFound(format!("{} is not downloaded", name)));
        }

        let model_dir = self.models_dir.join(&name);
        fs::remove_dir_all(&model_dir).await.map_err(|e| {
            ApplyLessError::ModelError(format!("Failed to remove model: {}", e))
        })?;
        self.downloaded_models.remove(&name);
        Ok(model_dir)
    }

    pub fn get_model_path(&self, model_id: &str) -> Option<PathBuf> {
        self.is_model_downloaded(model_id)
            .then(|| self.models_dir.join(model_id))
    }

    pub fn list_available_models(&self) -> &[AvailableModel] {
        &self.catalogue
    }

    pub fn list_downloaded_models(&self) -> Vec<String> {
        let mut models: Vec<String> = self.downloaded_models.iter().cloned().collect();
        models.sort();
        models
    }

    pub fn is_model_downloaded(&self, model_id: &str) -> bool {
        self.downloaded_models.contains(model_id)
    }

    pub fn get_model_info(&self, model_id: &str) -> Option<&AvailableModel> {
        let name = self.resolve_model_id(model_id)?;
        self.catalogue.iter().find(|m| m.name == name)
    }

    /// Resolve a catalogue name, Hub repo id, or case-insensitive name
    pub fn resolve_model_id(&self, input: &str) -> Option<String> {
        self.catalogue
            .iter()
            .find(|m| m.name == input || m.repo_id == input)
            .or_else(|| self.catalogue.iter().find(|m| m.name.eq_ignore_ascii_case(input)))
            .map(|m| m.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &Path) -> Config {
        let mut config = Config::default();
        config.models.models_dir = dir.join("models");
        config
    }

    #[tokio::test]
    async fn test_manager_creates_models_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(temp_dir.path());
        let manager = EmbeddingModelManager::new(&config).await.unwrap();

        assert!(config.models_dir().exists());
        assert!(!manager.list_available_models().is_empty());
        assert!(manager.list_downloaded_models().is_empty());
    }

    #[tokio::test]
    async fn test_scan_detects_complete_model_dirs_only() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(temp_dir.path());

        let complete = config.models_dir().join("potion-base-8M");
        std::fs::create_dir_all(&complete).unwrap();
        for file in REQUIRED_FILES {
            std::fs::write(complete.join(file), b"{}").unwrap();
        }
        let partial = config.models_dir().join("m2v-base");
        std::fs::create_dir_all(&partial).unwrap();
        std::fs::write(partial.join("tokenizer.json"), b"{}").unwrap();

        let manager = EmbeddingModelManager::new(&config).await.unwrap();
        assert!(manager.is_model_downloaded("potion-base-8M"));
        assert!(!manager.is_model_downloaded("m2v-base"));
        assert_eq!(manager.get_model_path("potion-base-8M"), Some(complete));
    }

    #[tokio::test]
    async fn test_resolve_model_id() {
        let temp_dir = TempDir::new().unwrap();
        let manager = EmbeddingModelManager::new(&config_in(temp_dir.path())).await.unwrap();

        assert_eq!(manager.resolve_model_id("potion-base-8M"), Some("potion-base-8M".to_string()));
        assert_eq!(manager.resolve_model_id("minishlab/potion-base-8M"), Some("potion-base-8M".to_string()));
        assert_eq!(manager.resolve_model_id("POTION-BASE-8M"), Some("potion-base-8M".to_string()));
        assert_eq!(manager.resolve_model_id("unknown"), None);
    }

    #[tokio::test]
    async fn test_remove_missing_model_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = EmbeddingModelManager::new(&config_in(temp_dir.path())).await.unwrap();
        assert!(matches!(
            manager.remove_model("potion-base-8M").await,
            Err(ApplyLessError::ModelNotFound(_))
        ));
    }
}
