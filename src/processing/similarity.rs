//! Text similarity strategies used by the matcher

use crate::config::Config;
use crate::error::{MatcherError, Result};
use crate::processing::embeddings::{cosine_similarity, EmbeddingBackend, LazyModel2Vec, ModelSource};
use crate::processing::sequence_matcher::SequenceMatcher;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Pluggable text comparison returning a score in `[0, 1]`.
///
/// Implementations are shared across worker threads during batch ranking.
/// A failure must be returned as an error rather than reported as zero
/// similarity, since a silent zero would skew rankings.
pub trait SimilarityStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn similarity(&self, text1: &str, text2: &str) -> Result<f64>;

    /// Called once before a batch so that a missing resource fails the batch
    /// up front instead of once per pair.
    fn prepare(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Semantic,
    Lexical,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Semantic => write!(f, "semantic"),
            StrategyKind::Lexical => write!(f, "lexical"),
        }
    }
}

impl StrategyKind {
    /// Build the strategy. The semantic variant only records which model to
    /// use; the model itself is loaded on first comparison.
    pub fn build(self, config: &Config) -> Arc<dyn SimilarityStrategy> {
        match self {
            StrategyKind::Lexical => Arc::new(LexicalSimilarity),
            StrategyKind::Semantic => {
                let backend = LazyModel2Vec::new(ModelSource::from_config(config));
                Arc::new(SemanticSimilarity::new(Arc::new(backend)))
            }
        }
    }
}

/// Character-sequence matching ratio over the raw strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalSimilarity;

impl SimilarityStrategy for LexicalSimilarity {
    fn name(&self) -> &str {
        "lexical"
    }

    fn similarity(&self, text1: &str, text2: &str) -> Result<f64> {
        Ok(SequenceMatcher::new(text1, text2).ratio())
    }
}

/// Cosine similarity of independently embedded texts.
#[derive(Clone)]
pub struct SemanticSimilarity {
    backend: Arc<dyn EmbeddingBackend>,
}

impl SemanticSimilarity {
    pub fn new(backend: Arc<dyn EmbeddingBackend>) -> Self {
        Self { backend }
    }

    pub fn model_name(&self) -> &str {
        self.backend.model_name()
    }

    /// Empty text stands for the zero vector and is never sent to the backend.
    fn embed(&self, text: &str) -> Result<Option<Vec<f32>>> {
        if text.is_empty() {
            return Ok(None);
        }
        self.backend.embed(text).map(Some).map_err(|e| self.failure(e))
    }

    fn failure(&self, err: MatcherError) -> MatcherError {
        MatcherError::Similarity {
            strategy: format!("semantic ({})", self.backend.model_name()),
            message: err.to_string(),
        }
    }
}

impl SimilarityStrategy for SemanticSimilarity {
    fn name(&self) -> &str {
        "semantic"
    }

    fn similarity(&self, text1: &str, text2: &str) -> Result<f64> {
        let first = self.embed(text1)?;
        let second = self.embed(text2)?;

        let (Some(first), Some(second)) = (first, second) else {
            return Ok(0.0);
        };

        let score = cosine_similarity(&first, &second).map_err(|e| self.failure(e))?;
        Ok(score.clamp(0.0, 1.0))
    }

    fn prepare(&self) -> Result<()> {
        self.backend.warm_up().map_err(|e| self.failure(e))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Bag-of-letters embedding: deterministic and model-free.
    pub(crate) struct LetterBackend {
        pub calls: AtomicUsize,
    }

    impl LetterBackend {
        pub(crate) fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl EmbeddingBackend for LetterBackend {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut v = vec![0.0f32; 26];
            for c in text.to_lowercase().chars().filter(|c| c.is_ascii_lowercase()) {
                v[(c as u8 - b'a') as usize] += 1.0;
            }
            Ok(v)
        }

        fn model_name(&self) -> &str {
            "letters"
        }
    }

    pub(crate) struct OfflineBackend;

    impl EmbeddingBackend for OfflineBackend {
        fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(MatcherError::Embedding("backend unreachable".to_string()))
        }

        fn model_name(&self) -> &str {
            "offline"
        }
    }

    /// Every call retries a model load that always fails, counting attempts.
    pub(crate) struct UnloadableBackend {
        pub loads: AtomicUsize,
    }

    impl UnloadableBackend {
        pub(crate) fn new() -> Self {
            Self {
                loads: AtomicUsize::new(0),
            }
        }

        fn try_load(&self) -> Result<()> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Err(MatcherError::ModelLoading("model files missing".to_string()))
        }
    }

    impl EmbeddingBackend for UnloadableBackend {
        fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            self.try_load()?;
            Ok(Vec::new())
        }

        fn model_name(&self) -> &str {
            "unloadable"
        }

        fn warm_up(&self) -> Result<()> {
            self.try_load()
        }
    }

    /// Points "up" texts along +x and everything else along -x.
    struct OppositeBackend;

    impl EmbeddingBackend for OppositeBackend {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            if text.starts_with("up") {
                Ok(vec![1.0, 0.0])
            } else {
                Ok(vec![-1.0, 0.0])
            }
        }

        fn model_name(&self) -> &str {
            "opposite"
        }
    }

    #[test]
    fn test_negative_cosine_clamped_to_zero() {
        let semantic = SemanticSimilarity::new(Arc::new(OppositeBackend));
        assert_eq!(semantic.similarity("up", "down").unwrap(), 0.0);
        assert_eq!(semantic.similarity("up", "upward").unwrap(), 1.0);
    }

    #[test]
    fn test_prepare_surfaces_load_failure() {
        let backend = Arc::new(UnloadableBackend::new());
        let semantic = SemanticSimilarity::new(backend.clone());

        let err = semantic.prepare().unwrap_err();
        assert!(err.is_strategy_failure());
        assert_eq!(backend.loads.load(Ordering::SeqCst), 1);
        assert!(LexicalSimilarity.prepare().is_ok());
    }

    #[test]
    fn test_lexical_identity_and_symmetry() {
        let lexical = LexicalSimilarity;
        assert_eq!(lexical.similarity("abc", "abc").unwrap(), 1.0);
        assert_eq!(
            lexical.similarity("Backend Engineer", "Data Engineer").unwrap(),
            lexical.similarity("Backend Engineer", "Data Engineer").unwrap()
        );
        assert_eq!(lexical.similarity("", "").unwrap(), 1.0);
    }

    #[test]
    fn test_semantic_identical_text() {
        let semantic = SemanticSimilarity::new(Arc::new(LetterBackend::new()));
        let score = semantic.similarity("Backend Engineer", "backend engineer").unwrap();
        assert!((score - 1.0).abs() < 1e-9);
        assert_eq!(semantic.model_name(), "letters");
    }

    #[test]
    fn test_semantic_empty_text_skips_backend() {
        let backend = Arc::new(LetterBackend::new());
        let semantic = SemanticSimilarity::new(backend.clone());

        assert_eq!(semantic.similarity("", "Backend role").unwrap(), 0.0);
        assert_eq!(semantic.similarity("", "").unwrap(), 0.0);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_semantic_failure_is_not_zero() {
        let semantic = SemanticSimilarity::new(Arc::new(OfflineBackend));
        let err = semantic.similarity("a", "b").unwrap_err();

        assert!(err.is_strategy_failure());
        assert!(err.to_string().contains("backend unreachable"));
    }

    #[test]
    fn test_strategy_kind_build() {
        let config = Config::default();
        assert_eq!(StrategyKind::Lexical.build(&config).name(), "lexical");
        // building does not touch the model
        assert_eq!(StrategyKind::Semantic.build(&config).name(), "semantic");
        assert_eq!(StrategyKind::default(), StrategyKind::Semantic);
    }
}
