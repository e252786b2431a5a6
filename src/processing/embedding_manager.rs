//! Catalogue and on-disk management of Model2Vec embedding models

use crate::error::{MatcherError, Result};
use hf_hub::api::tokio::Api;
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::fs;

pub const DEFAULT_MODEL: &str = "potion-base-8M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub repo_id: &'static str,
    pub size_mb: u64,
    pub dimensions: u32,
    pub description: &'static str,
}

/// Models the matcher knows how to fetch, in order of preference.
pub const MODEL_CATALOGUE: [ModelInfo; 3] = [
    ModelInfo {
        id: "potion-base-8M",
        name: "Potion Base 8M",
        repo_id: "minishlab/potion-base-8M",
        size_mb: 33,
        dimensions: 256,
        description: "Compact static embeddings, good default for short profile fields",
    },
    ModelInfo {
        id: "m2v-base",
        name: "Model2Vec Base",
        repo_id: "minishlab/M2V_base_output",
        size_mb: 90,
        dimensions: 256,
        description: "Model2Vec base output model",
    },
    ModelInfo {
        id: "m2v-large",
        name: "Model2Vec Large",
        repo_id: "minishlab/M2V_large_output",
        size_mb: 250,
        dimensions: 512,
        description: "Larger Model2Vec model for long job descriptions",
    },
];

const REQUIRED_FILES: [&str; 2] = ["tokenizer.json", "model.safetensors"];
const OPTIONAL_FILES: [&str; 2] = ["config.json", "README.md"];

/// Look up a catalogue entry by id, repo id or display name (case-insensitive).
pub fn find_model(input: &str) -> Option<&'static ModelInfo> {
    MODEL_CATALOGUE
        .iter()
        .find(|m| m.id == input)
        .or_else(|| MODEL_CATALOGUE.iter().find(|m| m.repo_id == input))
        .or_else(|| {
            let input_lower = input.to_lowercase();
            MODEL_CATALOGUE
                .iter()
                .find(|m| m.name.to_lowercase() == input_lower || m.id.to_lowercase() == input_lower)
        })
}

/// Hugging Face repo id for a catalogue model.
pub fn repo_id_for(name: &str) -> Option<String> {
    find_model(name).map(|m| m.repo_id.to_string())
}

/// Lists, downloads and removes models under the models directory.
pub struct ModelManager {
    models_dir: PathBuf,
    downloaded: BTreeSet<String>,
}

impl ModelManager {
    pub async fn new(models_dir: PathBuf) -> Result<Self> {
        if !models_dir.exists() {
            fs::create_dir_all(&models_dir)
                .await
                .map_err(|e| MatcherError::ModelError(format!("Failed to create models directory: {}", e)))?;
        }

        let mut manager = Self {
            models_dir,
            downloaded: BTreeSet::new(),
        };
        manager.scan_downloaded_models().await?;
        Ok(manager)
    }

    async fn scan_downloaded_models(&mut self) -> Result<()> {
        let mut entries = fs::read_dir(&self.models_dir)
            .await
            .map_err(|e| MatcherError::ModelError(format!("Failed to scan models directory: {}", e)))?;

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() && is_model_directory(&entry.path()).await {
                self.downloaded.insert(entry.file_name().to_string_lossy().to_string());
            }
        }

        debug!("Found {} downloaded models in {}", self.downloaded.len(), self.models_dir.display());
        Ok(())
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub fn is_downloaded(&self, model_id: &str) -> bool {
        self.downloaded.contains(model_id)
    }

    pub fn downloaded_models(&self) -> Vec<String> {
        self.downloaded.iter().cloned().collect()
    }

    pub fn model_path(&self, model_id: &str) -> Option<PathBuf> {
        self.is_downloaded(model_id).then(|| self.models_dir.join(model_id))
    }

    /// Resolve user input to a catalogue id.
    pub fn resolve_model_id(&self, input: &str) -> Option<String> {
        find_model(input).map(|m| m.id.to_string())
    }

    /// First downloaded model in catalogue order, else the default.
    pub fn auto_select_model(&self) -> String {
        MODEL_CATALOGUE
            .iter()
            .map(|m| m.id)
            .find(|id| self.is_downloaded(id))
            .unwrap_or(DEFAULT_MODEL)
            .to_string()
    }

    /// Fetch a catalogue model from the hub into `<models_dir>/<id>`.
    pub async fn download_model(&mut self, input: &str, force: bool) -> Result<PathBuf> {
        let info = find_model(input).ok_or_else(|| MatcherError::ModelNotFound(input.to_string()))?;
        let model_dir = self.models_dir.join(info.id);

        if self.is_downloaded(info.id) && !force {
            info!("Model '{}' already present at {}", info.id, model_dir.display());
            return Ok(model_dir);
        }

        info!("Downloading {} ({} MB) from {}", info.name, info.size_mb, info.repo_id);
        fs::create_dir_all(&model_dir)
            .await
            .map_err(|e| MatcherError::ModelError(format!("Failed to create model directory: {}", e)))?;

        let api = Api::new().map_err(|e| MatcherError::ModelError(format!("Failed to initialize HF API: {}", e)))?;
        let repo = api.model(info.repo_id.to_string());

        for file in REQUIRED_FILES {
            let cached = repo
                .get(file)
                .await
                .map_err(|e| MatcherError::ModelError(format!("Failed to download required file {}: {}", file, e)))?;
            fs::copy(&cached, model_dir.join(file)).await?;
            debug!("Downloaded {}", file);
        }

        for file in OPTIONAL_FILES {
            match repo.get(file).await {
                Ok(cached) => {
                    fs::copy(&cached, model_dir.join(file)).await?;
                    debug!("Downloaded {}", file);
                }
                Err(e) => warn!("Optional file {} not available: {}", file, e),
            }
        }

        self.downloaded.insert(info.id.to_string());
        info!("Model '{}' ready at {}", info.id, model_dir.display());
        Ok(model_dir)
    }

    pub async fn remove_model(&mut self, input: &str) -> Result<()> {
        let model_id = self.resolve_model_id(input).unwrap_or_else(|| input.to_string());
        if !self.downloaded.remove(&model_id) {
            return Err(MatcherError::ModelNotFound(model_id));
        }

        fs::remove_dir_all(self.models_dir.join(&model_id)).await?;
        info!("Removed model '{}'", model_id);
        Ok(())
    }
}

/// A model directory holds a tokenizer and safetensors weights.
async fn is_model_directory(path: &Path) -> bool {
    for file in REQUIRED_FILES {
        if fs::metadata(path.join(file)).await.is_err() {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn fake_model(dir: &Path, id: &str) {
        let model_dir = dir.join(id);
        fs::create_dir_all(&model_dir).await.unwrap();
        for file in REQUIRED_FILES {
            fs::write(model_dir.join(file), b"{}").await.unwrap();
        }
    }

    #[test]
    fn test_find_model_by_id_repo_and_name() {
        assert_eq!(find_model("potion-base-8M").map(|m| m.id), Some("potion-base-8M"));
        assert_eq!(find_model("minishlab/M2V_base_output").map(|m| m.id), Some("m2v-base"));
        assert_eq!(find_model("model2vec large").map(|m| m.id), Some("m2v-large"));
        assert!(find_model("bert-base-uncased").is_none());
        assert_eq!(repo_id_for("potion-base-8M").as_deref(), Some("minishlab/potion-base-8M"));
    }

    #[tokio::test]
    async fn test_manager_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let models_dir = temp_dir.path().join("models");
        let manager = ModelManager::new(models_dir.clone()).await.unwrap();

        assert!(models_dir.exists());
        assert!(manager.downloaded_models().is_empty());
        assert_eq!(manager.auto_select_model(), DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn test_scan_finds_complete_models_only() {
        let temp_dir = TempDir::new().unwrap();
        fake_model(temp_dir.path(), "m2v-large").await;
        fs::create_dir_all(temp_dir.path().join("partial")).await.unwrap();

        let manager = ModelManager::new(temp_dir.path().to_path_buf()).await.unwrap();

        assert_eq!(manager.downloaded_models(), vec!["m2v-large".to_string()]);
        assert_eq!(manager.auto_select_model(), "m2v-large");
        assert_eq!(manager.model_path("m2v-large"), Some(temp_dir.path().join("m2v-large")));
        assert!(manager.model_path("m2v-base").is_none());
    }

    #[tokio::test]
    async fn test_remove_model() {
        let temp_dir = TempDir::new().unwrap();
        fake_model(temp_dir.path(), "m2v-base").await;
        let mut manager = ModelManager::new(temp_dir.path().to_path_buf()).await.unwrap();

        manager.remove_model("Model2Vec Base").await.unwrap();
        assert!(!temp_dir.path().join("m2v-base").exists());
        assert!(!manager.is_downloaded("m2v-base"));

        let err = manager.remove_model("m2v-base").await.unwrap_err();
        assert!(matches!(err, MatcherError::ModelNotFound(_)));
    }

    #[tokio::test]
    async fn test_download_unknown_model() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = ModelManager::new(temp_dir.path().to_path_buf()).await.unwrap();

        let err = manager.download_model("not-a-model", false).await.unwrap_err();
        assert!(matches!(err, MatcherError::ModelNotFound(_)));
    }
}
