//! Error handling for the resume matcher

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatcherError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Similarity strategy '{strategy}' failed: {message}")]
    Similarity { strategy: String, message: String },

    #[error("Embedding generation error: {0}")]
    Embedding(String),

    #[error("Model loading error: {0}")]
    ModelLoading(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Ranking failed for pair #{index} ({record_id}): {source}")]
    Ranking {
        index: usize,
        record_id: String,
        #[source]
        source: Box<MatcherError>,
    },

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, MatcherError>;

impl MatcherError {
    /// True when the error came out of a similarity strategy or its embedding backend.
    pub fn is_strategy_failure(&self) -> bool {
        match self {
            MatcherError::Similarity { .. }
            | MatcherError::Embedding(_)
            | MatcherError::ModelLoading(_) => true,
            MatcherError::Ranking { source, .. } => source.is_strategy_failure(),
            _ => false,
        }
    }
}

/// The Model2Vec loader reports failures through anyhow
impl From<anyhow::Error> for MatcherError {
    fn from(err: anyhow::Error) -> Self {
        MatcherError::ModelLoading(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_failure_classification() {
        let err = MatcherError::Similarity {
            strategy: "semantic".to_string(),
            message: "backend offline".to_string(),
        };
        assert!(err.is_strategy_failure());
        assert!(!MatcherError::InvalidInput("x".to_string()).is_strategy_failure());

        let wrapped = MatcherError::Ranking {
            index: 2,
            record_id: "job-3".to_string(),
            source: Box::new(MatcherError::Embedding("timeout".to_string())),
        };
        assert!(wrapped.is_strategy_failure());
        assert!(wrapped.to_string().contains("pair #2"));
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: MatcherError = anyhow::anyhow!("missing tokenizer.json").into();
        assert!(matches!(err, MatcherError::ModelLoading(ref m) if m.contains("tokenizer")));
    }
}
