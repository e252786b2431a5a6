//! Embedding backends for the semantic similarity strategy

use crate::config::Config;
use crate::error::{MatcherError, Result};
use log::{debug, info, warn};
use model2vec_rs::model::StaticModel;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Instant;

/// Turns text into a dense vector.
pub trait EmbeddingBackend: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn model_name(&self) -> &str;

    /// Load whatever the backend needs before a batch. Backends that are
    /// ready on construction keep the default.
    fn warm_up(&self) -> Result<()> {
        Ok(())
    }
}

/// Where to load a Model2Vec model from: a local directory or a Hugging Face repo id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSource {
    pub name: String,
    pub location: PathBuf,
}

impl ModelSource {
    /// Prefer a downloaded copy under the models directory; otherwise hand
    /// the repo id to the loader, which fetches it from the hub.
    pub fn from_config(config: &Config) -> Self {
        let name = config.models.default_embedding_model.clone();
        let local = config.models_dir().join(&name);
        let location = if local.exists() {
            local
        } else {
            let repo_id = crate::processing::embedding_manager::repo_id_for(&name)
                .unwrap_or_else(|| name.clone());
            PathBuf::from(repo_id)
        };
        Self { name, location }
    }
}

/// Maximum number of memoized embeddings before the memo is reset.
pub const MEMO_CAPACITY: usize = 10_000;

/// Bounded text-to-embedding memo. When full, it is cleared before the next
/// insert rather than evicting entries one by one.
pub struct EmbeddingMemo {
    capacity: usize,
    entries: RwLock<HashMap<String, Vec<f32>>>,
}

impl EmbeddingMemo {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, text: &str) -> Option<Vec<f32>> {
        self.entries.read().ok()?.get(text).cloned()
    }

    pub fn insert(&self, text: &str, embedding: Vec<f32>) {
        if let Ok(mut entries) = self.entries.write() {
            if entries.len() >= self.capacity && !entries.contains_key(text) {
                debug!("Embedding memo reached {} entries; clearing", entries.len());
                entries.clear();
            }
            entries.insert(text.to_string(), embedding);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Model2Vec static embeddings with a bounded per-text memo.
pub struct Model2VecBackend {
    model: StaticModel,
    model_name: String,
    memo: EmbeddingMemo,
}

static SHARED_MODEL: OnceCell<Arc<Model2VecBackend>> = OnceCell::new();

impl Model2VecBackend {
    pub fn load(source: &ModelSource) -> Result<Self> {
        let start_time = Instant::now();
        info!("Loading Model2Vec embedding model from: {}", source.location.display());

        let model = StaticModel::from_pretrained(&source.location, None, None, None)
            .map_err(|e| MatcherError::ModelLoading(format!("Failed to load model '{}': {}", source.name, e)))?;

        info!("Model '{}' loaded in {:.2?}", source.name, start_time.elapsed());

        Ok(Self {
            model,
            model_name: source.name.clone(),
            memo: EmbeddingMemo::new(MEMO_CAPACITY),
        })
    }

    /// Process-wide instance, loaded on first call and never replaced.
    /// A failed load leaves the slot empty so a later call can retry.
    pub fn shared(source: &ModelSource) -> Result<Arc<Self>> {
        let backend = SHARED_MODEL.get_or_try_init(|| Self::load(source).map(Arc::new))?;
        if backend.model_name != source.name {
            warn!(
                "Embedding model '{}' already loaded for this process; ignoring request for '{}'",
                backend.model_name, source.name
            );
        }
        Ok(Arc::clone(backend))
    }
}

impl EmbeddingBackend for Model2VecBackend {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(embedding) = self.memo.get(text) {
            return Ok(embedding);
        }

        let embedding = self.model.encode_single(text);
        if embedding.is_empty() {
            return Err(MatcherError::Embedding(format!(
                "model '{}' produced an empty embedding",
                self.model_name
            )));
        }

        self.memo.insert(text, embedding.clone());
        debug!(
            "Embedded {} chars into {} dims ({} memoized)",
            text.len(),
            embedding.len(),
            self.memo.len()
        );
        Ok(embedding)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Defers loading the shared Model2Vec model until the first embedding is
/// requested.
pub struct LazyModel2Vec {
    source: ModelSource,
}

impl LazyModel2Vec {
    pub fn new(source: ModelSource) -> Self {
        Self { source }
    }
}

impl EmbeddingBackend for LazyModel2Vec {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Model2VecBackend::shared(&self.source)?.embed(text)
    }

    fn model_name(&self) -> &str {
        &self.source.name
    }

    fn warm_up(&self) -> Result<()> {
        Model2VecBackend::shared(&self.source).map(|_| ())
    }
}

/// Cosine similarity of two embeddings. A zero vector on either side
/// yields 0; mismatched dimensions are an error.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(MatcherError::Embedding(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    let dot_product: f64 = a.iter().zip(b).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        Ok(0.0)
    } else {
        Ok(dot_product / (norm_a * norm_b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = [1.0, 0.0, 1.0];
        assert!((cosine_similarity(&a, &a).unwrap() - 1.0).abs() < 1e-12);
        assert!((cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap()).abs() < 1e-12);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_vector_is_zero_similarity() {
        assert_eq!(cosine_similarity(&[0.0; 4], &[1.0, 2.0, 3.0, 4.0]).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&[], &[]).unwrap(), 0.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = cosine_similarity(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert!(matches!(err, MatcherError::Embedding(_)));
    }

    #[test]
    fn test_memo_is_bounded() {
        let memo = EmbeddingMemo::new(2);
        memo.insert("a", vec![1.0]);
        memo.insert("b", vec![2.0]);
        assert_eq!(memo.len(), 2);

        // re-inserting a known text does not reset
        memo.insert("a", vec![1.5]);
        assert_eq!(memo.get("a"), Some(vec![1.5]));
        assert_eq!(memo.len(), 2);

        memo.insert("c", vec![3.0]);
        assert_eq!(memo.len(), 1);
        assert!(memo.get("a").is_none());
        assert_eq!(memo.get("c"), Some(vec![3.0]));
        assert!(!memo.is_empty());
    }

    #[test]
    fn test_model_source_falls_back_to_repo_id() {
        let mut config = Config::default();
        config.models.models_dir = PathBuf::from("/nonexistent/models");
        config.models.default_embedding_model = "potion-base-8M".to_string();

        let source = ModelSource::from_config(&config);
        assert_eq!(source.name, "potion-base-8M");
        assert_eq!(source.location, PathBuf::from("minishlab/potion-base-8M"));
    }

    #[test]
    fn test_model_source_prefers_local_copy() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("m2v-base")).unwrap();

        let mut config = Config::default();
        config.models.models_dir = temp_dir.path().to_path_buf();
        config.models.default_embedding_model = "m2v-base".to_string();

        let source = ModelSource::from_config(&config);
        assert_eq!(source.location, temp_dir.path().join("m2v-base"));
    }
}
